//! System prompts, canned replies and prompt builders.
//!
//! System prompts can be overridden by Markdown files in a `prompts/`
//! directory next to the working directory; built-in text is used otherwise.

use std::path::PathBuf;

use crate::{Error, Result};

/// Maximum characters of page text embedded in any prompt.
pub const PROMPT_CHAR_BUDGET: usize = 2000;

/// Maximum characters of a search preview snippet.
pub const PREVIEW_CHARS: usize = 500;

/// Characters of a page shown when it is opened from the page list.
pub const PAGE_PREVIEW_CHARS: usize = 1000;

pub const GREETING_REPLY: &str = "Hello! How can I help you with Fandom wikis today?";
pub const FAREWELL_REPLY: &str = "Goodbye! If you have more Fandom questions, just ask.";
pub const THANKS_REPLY: &str = "You're welcome! Let me know if you need anything else.";
pub const NO_RELEVANT_ARTICLE: &str = "No relevant article found.";
pub const MAIN_PAGE_UNAVAILABLE: &str = "Failed to load the main page for this Fandom.";
pub const LOCAL_AI_UNAVAILABLE: &str = "Local AI is not available. Please use an API model.";
pub const API_KEY_REQUIRED: &str = "API key required. Please enter your key or buy access.";

const CASUAL_DEFAULT: &str =
    "You are a friendly Fandom wiki assistant who can also chat casually.";
const WIKI_EXPERT_DEFAULT: &str = "You are a helpful assistant for Fandom wikis.";

/// Available system prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Small talk: greetings, farewells, thanks.
    Casual,
    /// Answers grounded in wiki page text.
    WikiExpert,
}

impl Prompt {
    /// Override file name (Markdown).
    pub fn filename(&self) -> &'static str {
        match self {
            Prompt::Casual => "casual.md",
            Prompt::WikiExpert => "wiki_expert.md",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            Prompt::Casual => CASUAL_DEFAULT,
            Prompt::WikiExpert => WIKI_EXPERT_DEFAULT,
        }
    }

    /// Prompt text, from file when present.
    pub fn text(&self) -> String {
        load_prompt(self.filename())
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.builtin().to_string())
    }
}

/// Load a prompt by file name.
pub fn load_prompt(filename: &str) -> Result<String> {
    let path = prompts_dir().join(filename);
    std::fs::read_to_string(&path)
        .map_err(|e| Error::InvalidArgument(format!("Failed to load prompt {}: {}", filename, e)))
}

/// Prompts directory.
pub fn prompts_dir() -> PathBuf {
    let candidates = [PathBuf::from("prompts"), PathBuf::from("../prompts")];

    for path in candidates {
        if path.exists() {
            return path;
        }
    }

    PathBuf::from("prompts")
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Question answered from the best-matching article of a full search.
pub fn best_match_prompt(query: &str, url: &str, page_text: &str) -> String {
    format!(
        "You are an expert on Fandom wikis. The user asked: '{}'. Here is the best matching page content from {}:\n{}\nPlease answer the user's request as helpfully as possible.",
        query,
        url,
        truncate_chars(page_text, PROMPT_CHAR_BUDGET)
    )
}

/// Question answered from the wiki's main page.
pub fn main_page_prompt(query: &str, page_text: &str) -> String {
    format!(
        "You are an expert on Fandom wikis. The user asked: '{}'. Here is the main page content:\n{}\nPlease answer the user's request as helpfully as possible.",
        query,
        truncate_chars(page_text, PROMPT_CHAR_BUDGET)
    )
}

/// Summary of a page or of one section.
pub fn summary_prompt(section: Option<&str>, page_text: &str) -> String {
    let subject = match section {
        Some(name) => format!("the '{}' section of a Fandom wiki page", name),
        None => "a Fandom wiki page".to_string(),
    };
    format!(
        "Summarize {} in a few sentences:\n{}",
        subject,
        truncate_chars(page_text, PROMPT_CHAR_BUDGET)
    )
}

/// Question answered from the currently loaded page.
pub fn page_question_prompt(question: &str, page_text: &str) -> String {
    format!(
        "Answer the question using only this Fandom wiki page.\nQuestion: {}\nPage content:\n{}",
        question,
        truncate_chars(page_text, PROMPT_CHAR_BUDGET)
    )
}
