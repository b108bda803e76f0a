//! One chat capability over the three remote providers.
//!
//! `ChatBackend::send` never fails: transport errors, bad statuses and
//! unexpected response shapes come back as an inline `[<Provider> error: …]`
//! reply so the transcript always gets something.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ClaudeClient, GeminiClient, OpenAIClient};
use crate::config::Backend;
use crate::metrics;
use crate::Result;

/// Reply length cap sent to every provider.
pub const MAX_REPLY_TOKENS: u32 = 600;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A configured remote chat provider.
#[derive(Debug, Clone)]
pub enum ChatBackend {
    OpenAI(OpenAIClient),
    Gemini(GeminiClient),
    Claude(ClaudeClient),
}

impl ChatBackend {
    /// Build the client for `backend`. Local rules and blank keys give `None`.
    pub fn from_selection(backend: Backend, api_key: Option<&str>) -> Result<Option<Self>> {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        Ok(match backend {
            Backend::LocalRules => None,
            Backend::OpenAI => Some(ChatBackend::OpenAI(OpenAIClient::new(key)?)),
            Backend::Gemini => Some(ChatBackend::Gemini(GeminiClient::new(key)?)),
            Backend::Claude => Some(ChatBackend::Claude(ClaudeClient::new(key)?)),
        })
    }

    pub fn backend(&self) -> Backend {
        match self {
            ChatBackend::OpenAI(_) => Backend::OpenAI,
            ChatBackend::Gemini(_) => Backend::Gemini,
            ChatBackend::Claude(_) => Backend::Claude,
        }
    }

    /// Speaker label shown in the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            ChatBackend::OpenAI(_) => "ChatGPT",
            ChatBackend::Gemini(_) => "Gemini",
            ChatBackend::Claude(_) => "Claude",
        }
    }

    /// Send `messages` and return the reply text or an inline error tag.
    pub async fn send(&self, messages: &[ChatMessage]) -> String {
        let provider = self.backend().provider_name();
        info!(provider, messages = messages.len(), "Sending chat request");

        let result = match self {
            ChatBackend::OpenAI(client) => client.chat(messages).await,
            ChatBackend::Gemini(client) => client.chat(messages).await,
            ChatBackend::Claude(client) => client.chat(messages).await,
        };

        match result {
            Ok(reply) => {
                metrics::record_backend_request(provider, true);
                reply
            }
            Err(err) => {
                metrics::record_backend_request(provider, false);
                warn!(provider, "Chat request failed: {}", err);
                format!("[{} error: {}]", provider, err.detail())
            }
        }
    }
}
