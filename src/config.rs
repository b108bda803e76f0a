//! Settings for the Fandom assistant
//!
//! API keys live in a flat JSON file in the user's home directory
//! (`fandom_ai_config.json`). Environment variables (optionally from `.env`)
//! fill in keys the file leaves empty.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Settings file name, placed in the home directory.
pub const CONFIG_FILE_NAME: &str = "fandom_ai_config.json";

/// Built-in wikis for quick selection.
pub const FANDOMS: &[(&str, &str)] = &[
    (
        "Bee Swarm Simulator",
        "https://bee-swarm-simulator.fandom.com/wiki/Codes",
    ),
    ("Minecraft", "https://minecraft.fandom.com/wiki/Minecraft_Wiki"),
    ("Roblox", "https://roblox.fandom.com/wiki/Roblox_Wiki"),
    ("Pokémon", "https://pokemon.fandom.com/wiki/Pokémon_Wiki"),
    ("Fortnite", "https://fortnite.fandom.com/wiki/Fortnite_Wiki"),
];

/// Look up a built-in wiki URL by name (case-insensitive).
pub fn wiki_url(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    FANDOMS
        .iter()
        .find(|(n, _)| n.to_lowercase() == wanted)
        .map(|(_, url)| *url)
}

/// Pick the wiki to work on: an explicit URL wins, then a built-in name,
/// then the first built-in wiki.
pub fn resolve_wiki_url(wiki: Option<&str>, url: Option<&str>) -> Result<String> {
    if let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) {
        return Ok(url.to_string());
    }
    match wiki {
        Some(name) => wiki_url(name)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown wiki: {}", name))),
        None => Ok(FANDOMS[0].1.to_string()),
    }
}

/// Which handler answers chat utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Canned replies only, no network model.
    LocalRules,
    #[default]
    OpenAI,
    Gemini,
    Claude,
}

impl Backend {
    /// Human-readable provider name used in error tags.
    pub fn provider_name(&self) -> &'static str {
        match self {
            Backend::LocalRules => "Local",
            Backend::OpenAI => "OpenAI",
            Backend::Gemini => "Gemini",
            Backend::Claude => "Claude",
        }
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Backend::LocalRules)
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" | "open source" | "local-rules" => Ok(Backend::LocalRules),
            "openai" | "gpt" | "gpt-3.5 turbo" | "chatgpt" => Ok(Backend::OpenAI),
            "gemini" | "gemini pro" => Ok(Backend::Gemini),
            "claude" | "claude 3" | "anthropic" => Ok(Backend::Claude),
            other => Err(Error::InvalidArgument(format!("Unknown backend: {}", other))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::LocalRules => "local",
            Backend::OpenAI => "openai",
            Backend::Gemini => "gemini",
            Backend::Claude => "claude",
        })
    }
}

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default)]
    pub claude_api_key: String,
}

impl Config {
    /// Default settings path: `~/fandom_ai_config.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Load settings from the default path, then fill blanks from the environment.
    /// Unreadable or malformed files degrade to empty settings.
    pub fn load() -> Self {
        Self::load_dotenv();
        let path = Self::default_path();
        let mut config = Self::load_or_default(&path);
        config.fill_from_env();
        config
    }

    /// Load from `path`, falling back to empty settings on any failure.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        }
        Self::load_from_file(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "Ignoring settings file: {}", err);
            Self::default()
        })
    }

    /// Load from a specific file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Write settings as a single JSON object.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string(self)?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Environment keys only fill values the file left empty.
    pub fn fill_from_env(&mut self) {
        Self::fill_one(&mut self.openai_api_key, "OPENAI_API_KEY");
        Self::fill_one(&mut self.gemini_api_key, "GOOGLE_API_KEY");
        Self::fill_one(&mut self.claude_api_key, "ANTHROPIC_API_KEY");
    }

    fn fill_one(slot: &mut String, env_key: &str) {
        if !slot.trim().is_empty() {
            return;
        }
        if let Ok(value) = std::env::var(env_key) {
            *slot = value;
        }
    }

    /// API key for a backend; blank keys count as absent.
    pub fn api_key_for(&self, backend: Backend) -> Option<&str> {
        let key = match backend {
            Backend::LocalRules => return None,
            Backend::OpenAI => &self.openai_api_key,
            Backend::Gemini => &self.gemini_api_key,
            Backend::Claude => &self.claude_api_key,
        };
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }

    /// Replace the key stored for a remote backend.
    pub fn set_api_key(&mut self, backend: Backend, key: &str) -> Result<()> {
        let slot = match backend {
            Backend::LocalRules => {
                return Err(Error::InvalidArgument(
                    "The local backend has no API key".to_string(),
                ))
            }
            Backend::OpenAI => &mut self.openai_api_key,
            Backend::Gemini => &mut self.gemini_api_key,
            Backend::Claude => &mut self.claude_api_key,
        };
        *slot = key.trim().to_string();
        Ok(())
    }
}

/// Mask a secret for display, keeping the last four characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
