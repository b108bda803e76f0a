//! Anthropic Claude messages client.
//!
//! System messages go to the top-level `system` field; user messages are
//! joined into one user turn.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::backend::{ChatMessage, Role, MAX_REPLY_TOKENS, TEMPERATURE};
use crate::{Error, Result};

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model.
pub const CLAUDE_DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Anthropic Claude client.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    /// Create client with API key.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("Claude API key is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!("fandom_ai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: CLAUDE_API_URL.to_string(),
            model: CLAUDE_DEFAULT_MODEL.to_string(),
        })
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Point the client at another API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn build_request(&self, messages: &[ChatMessage]) -> ClaudeRequest {
        let joined = |role: Role| -> String {
            messages
                .iter()
                .filter(|m| m.role == role)
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        let system = joined(Role::System);
        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: MAX_REPLY_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![Message {
                role: "user".to_string(),
                content: joined(Role::User),
            }],
            system: (!system.is_empty()).then_some(system),
        }
    }

    /// Send messages and return the first text block of the reply.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let payload = self.build_request(messages);

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Claude request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Provider(format!("Claude error {}: {}", status, text)));
        }

        let claude_response: ClaudeResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Provider(format!("Invalid Claude response: {} - {}", e, text))
        })?;

        claude_response
            .content
            .into_iter()
            .find_map(|c| match c {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| Error::Provider("Empty response from Claude".to_string()))
    }
}

// === Request ===

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

// === Response ===

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_empty_key() {
        let err = ClaudeClient::new("   ").unwrap_err();
        assert!(format!("{}", err).contains("empty"));
    }

    #[test]
    fn test_with_model() {
        let client = ClaudeClient::new("test_key")
            .unwrap()
            .with_model("claude-3-haiku-20240307");
        assert_eq!(client.model, "claude-3-haiku-20240307");
    }

    #[test]
    fn anthropic_version_constant() {
        assert_eq!(ANTHROPIC_VERSION, "2023-06-01");
    }

    #[test]
    fn request_joins_user_messages() {
        let client = ClaudeClient::new("k").unwrap();
        let request = client.build_request(&[
            ChatMessage::system("sys"),
            ChatMessage::user("a"),
            ChatMessage::user("b"),
        ]);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "a\n\nb");
        assert_eq!(request.system.as_deref(), Some("sys"));
        assert_eq!(request.max_tokens, 600);
    }

    fn client(server: &MockServer) -> ClaudeClient {
        ClaudeClient::new("test_key")
            .expect("client")
            .with_base_url(&server.base_url())
    }

    #[tokio::test]
    async fn chat_sends_headers_and_returns_text() {
        let server = MockServer::start_async().await;

        let chat_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/messages")
                .header("x-api-key", "test_key")
                .header("anthropic-version", ANTHROPIC_VERSION)
                .is_true(|req| {
                    let body = String::from_utf8_lossy(req.body().as_ref());
                    body.contains("SYS_PROMPT") && body.contains("claude-3-opus-20240229")
                });
            then.status(200).json_body(json!({
                "content": [
                    { "type": "text", "text": "Hello from Claude" }
                ]
            }));
        });

        let reply = client(&server)
            .chat(&[ChatMessage::system("SYS_PROMPT"), ChatMessage::user("Hi")])
            .await
            .unwrap();

        assert_eq!(reply, "Hello from Claude");
        chat_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn chat_returns_error_on_non_success_status() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path("/messages");
            then.status(500).body("boom");
        });

        let err = client(&server)
            .chat(&[ChatMessage::user("Hi")])
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Claude error 500"));
        assert!(msg.contains("boom"));
    }

    #[tokio::test]
    async fn chat_returns_error_on_empty_content() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path("/messages");
            then.status(200).json_body(json!({ "content": [] }));
        });

        let err = client(&server)
            .chat(&[ChatMessage::user("Hi")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Empty response from Claude"));
    }
}
