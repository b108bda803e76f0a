//! Fandom Wiki Assistant Library
//!
//! This library provides tools to:
//! - Fetch Fandom/MediaWiki articles and their `Special:AllPages` index
//! - Find the page that mentions a term most often across a whole wiki
//! - Pull sections, links and infobox rows out of an article
//! - Classify chat utterances and answer them with OpenAI, Gemini or Claude
//! - Keep an in-memory chat transcript shared between workers

pub mod config;
pub mod error;
pub mod integrations;
pub mod metrics;
pub mod prompts;
pub mod router;
pub mod transcript;
pub mod wiki;

// Re-export common types
pub use config::{Backend, Config, FANDOMS};
pub use error::{Error, Result};
pub use integrations::{ChatBackend, ChatMessage, ClaudeClient, GeminiClient, OpenAIClient};
pub use prompts::{load_prompt, Prompt};
pub use router::{classify, Intent, Reply, Router};
pub use transcript::{SharedTranscript, Transcript};
pub use wiki::{SearchResult, WikiClient};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
