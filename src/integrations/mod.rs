//! Chat provider integrations.
//!
//! Provides clients for:
//! - OpenAI (chat completions)
//! - Google Gemini (generate content)
//! - Anthropic Claude (messages)
//!
//! and `ChatBackend`, which puts all three behind one `send`.

pub mod backend;
pub mod claude;
pub mod gemini;
pub mod openai;

pub use backend::{ChatBackend, ChatMessage, Role};
pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
