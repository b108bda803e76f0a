//! Google Gemini generate-content client.
//!
//! System messages become the `systemInstruction`; user messages become the
//! parts of a single user turn.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::backend::{ChatMessage, Role, MAX_REPLY_TOKENS, TEMPERATURE};
use crate::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-pro";

/// Google Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create client with API key.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("Gemini API key is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!("fandom_ai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            model: GEMINI_DEFAULT_MODEL.to_string(),
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

    fn build_request(messages: &[ChatMessage]) -> GeminiRequest {
        let parts_for = |role: Role| -> Vec<Part> {
            messages
                .iter()
                .filter(|m| m.role == role)
                .map(|m| Part {
                    text: m.content.clone(),
                })
                .collect()
        };

        let system = parts_for(Role::System);
        GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts_for(Role::User),
            }],
            generation_config: Some(GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_REPLY_TOKENS,
            }),
            system_instruction: (!system.is_empty()).then_some(SystemInstruction { parts: system }),
        }
    }

    /// Generate content and return the first candidate's first text part.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let payload = Self::build_request(messages);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Gemini request failed: {}", e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(Error::Provider(format!("Gemini error {}: {}", status, text)));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Provider(format!("Invalid Gemini response: {} - {}", e, text))
        })?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| Error::Provider("Empty response from Gemini".to_string()))
    }
}

// === Request ===

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

// === Response ===

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
