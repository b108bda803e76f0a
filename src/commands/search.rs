//! Full-wiki best-match search

use tracing::info;

use crate::error::Result;
use crate::prompts::NO_RELEVANT_ARTICLE;
use crate::wiki::{SearchResult, WikiClient};

/// Text printed for a finished search.
pub fn render(result: Option<&SearchResult>) -> String {
    match result {
        Some(hit) => format!("Best match: {}\nPreview: {}...", hit.url, hit.preview),
        None => NO_RELEVANT_ARTICLE.to_string(),
    }
}

/// Scan the wiki `url` belongs to and return the rendered result.
pub async fn execute(wiki: &WikiClient, url: &str, term: &str) -> Result<String> {
    info!(
        "Searching all pages for '{}' (this may take a while)...",
        term
    );
    let result = wiki.find_best_match(url, term).await?;
    if let Some(hit) = &result {
        info!(url = %hit.url, score = hit.score, "Best match found");
    }
    Ok(render(result.as_ref()))
}

pub async fn run(url: &str, term: &str, concurrency: usize) -> Result<()> {
    let wiki = WikiClient::new()?.with_concurrency(concurrency);
    println!("{}", execute(&wiki, url, term).await?);
    Ok(())
}
