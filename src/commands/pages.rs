//! Page index browser

use crate::error::Result;
use crate::prompts::{truncate_chars, PAGE_PREVIEW_CHARS};
use crate::wiki::WikiClient;

/// Body of the `[Page Loaded]` entry for an opened page.
pub fn page_preview(title: &str, text: &str) -> String {
    format!(
        "{}\n{}...\n(Page loaded. You can now ask questions about this page.)",
        title,
        truncate_chars(text, PAGE_PREVIEW_CHARS)
    )
}

pub fn render_titles(titles: &[String]) -> String {
    if titles.is_empty() {
        return "No pages found. The page index may be unavailable.".to_string();
    }
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{:>4}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// List page titles, or open one page when `open` is given.
pub async fn run(url: &str, open: Option<&str>) -> Result<()> {
    let wiki = WikiClient::new()?;
    match open {
        Some(title) => {
            let text = wiki.open_page(url, title).await?;
            println!("{}", page_preview(title, &text));
        }
        None => {
            let titles = wiki.list_titles(url).await?;
            println!("{}", render_titles(&titles));
        }
    }
    Ok(())
}
