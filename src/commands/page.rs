//! Tools that work on one wiki page
//!
//! Structure tools (sections, links, infobox, find) only read the page.
//! Summaries and questions go through the chat backend and fall back to a
//! notice when only local rules are available.

use tracing::info;

use crate::error::Result;
use crate::integrations::{ChatBackend, ChatMessage};
use crate::prompts::{self, Prompt};
use crate::wiki::{extract, WikiClient};

pub const SECTION_MISSING: &str = "Section not found or empty.";
pub const NO_INFOBOX: &str = "No infobox found on this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTool {
    Sections,
    Links,
    Infobox,
    /// Case-insensitive "is this term on the page".
    Find(String),
    Summarize,
    Ask(String),
    SumSection(String),
}

impl PageTool {
    /// Tools answered by the chat backend.
    pub fn uses_backend(&self) -> bool {
        matches!(
            self,
            PageTool::Summarize | PageTool::Ask(_) | PageTool::SumSection(_)
        )
    }
}

pub fn render_sections(names: &[String]) -> String {
    if names.is_empty() {
        return "No sections found on this page.".to_string();
    }
    let mut out = String::from("Sections on this page:");
    for name in names {
        out.push_str("\n- ");
        out.push_str(name);
    }
    out
}

pub fn render_links(links: &[String]) -> String {
    if links.is_empty() {
        return "No wiki links found on this page.".to_string();
    }
    let mut out = String::from("Links on this page:");
    for link in links {
        out.push_str("\n- ");
        out.push_str(link);
    }
    out
}

pub fn render_infobox(rows: Option<&[(String, String)]>) -> String {
    let Some(rows) = rows else {
        return NO_INFOBOX.to_string();
    };
    let mut out = String::from("Infobox data:");
    for (label, value) in rows {
        out.push_str(&format!("\n- {}: {}", label, value));
    }
    out
}

pub fn render_find(text: &str, term: &str) -> String {
    let term = term.trim().to_lowercase();
    if extract::contains_term(text, &term) {
        format!("Found '{}' in the page!", term)
    } else {
        format!("'{}' not found in the page.", term)
    }
}

async fn ask_backend(backend: &ChatBackend, prompt: String) -> String {
    let messages = [
        ChatMessage::system(Prompt::WikiExpert.text()),
        ChatMessage::user(prompt),
    ];
    backend.send(&messages).await
}

/// Run `tool` against the page at `url`.
///
/// Fetch failures propagate; backend failures come back as inline error tags.
pub async fn execute(
    wiki: &WikiClient,
    backend: Option<&ChatBackend>,
    url: &str,
    tool: &PageTool,
) -> Result<String> {
    info!(url, ?tool, "Running page tool");

    if tool.uses_backend() && backend.is_none() {
        return Ok(prompts::LOCAL_AI_UNAVAILABLE.to_string());
    }

    let html = wiki.fetch_html(url).await?;

    Ok(match (tool, backend) {
        (PageTool::Sections, _) => render_sections(&extract::sections(&html)?),
        (PageTool::Links, _) => render_links(&extract::wiki_links(&html)?),
        (PageTool::Infobox, _) => render_infobox(extract::infobox(&html)?.as_deref()),
        (PageTool::Find(term), _) => render_find(&extract::content_text(&html)?, term),
        (PageTool::Summarize, Some(backend)) => {
            let text = extract::content_text(&html)?;
            let reply = ask_backend(backend, prompts::summary_prompt(None, &text)).await;
            format!("Summary:\n{}", reply)
        }
        (PageTool::Ask(question), Some(backend)) => {
            let text = extract::content_text(&html)?;
            let reply = ask_backend(backend, prompts::page_question_prompt(question, &text)).await;
            format!("Answer: {}", reply)
        }
        (PageTool::SumSection(name), Some(backend)) => {
            match extract::section_text(&html, name)? {
                Some(text) => {
                    let reply =
                        ask_backend(backend, prompts::summary_prompt(Some(name), &text)).await;
                    format!("Section Summary:\n{}", reply)
                }
                None => SECTION_MISSING.to_string(),
            }
        }
        (PageTool::Summarize | PageTool::Ask(_) | PageTool::SumSection(_), None) => {
            prompts::LOCAL_AI_UNAVAILABLE.to_string()
        }
    })
}

/// Print the output of `tool` for the page at `url`.
pub async fn run(url: &str, tool: PageTool, backend: Option<ChatBackend>) -> Result<()> {
    let wiki = WikiClient::new()?;
    let output = execute(&wiki, backend.as_ref(), url, &tool).await?;
    println!("{}", output);
    Ok(())
}
