//! Best-match article search over a wiki's full page index.
//!
//! Scores every page by the number of case-insensitive, non-overlapping
//! substring occurrences of the search term ("bee" also counts inside
//! "beekeeper"). Pages are fetched with bounded concurrency but scored in
//! index order, so ties always go to the page listed first. Pages that
//! fail to load are skipped.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::client::WikiClient;
use crate::metrics;
use crate::prompts::{truncate_chars, PREVIEW_CHARS, PROMPT_CHAR_BUDGET};
use crate::Result;

/// Winning article of a full scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: String,
    pub score: usize,
    /// First `PREVIEW_CHARS` characters of the article text.
    pub preview: String,
    /// First `PROMPT_CHAR_BUDGET` characters, for prompt building.
    pub excerpt: String,
}

impl SearchResult {
    fn new(url: String, score: usize, text: &str) -> Self {
        Self {
            url,
            score,
            preview: truncate_chars(text, PREVIEW_CHARS).to_string(),
            excerpt: truncate_chars(text, PROMPT_CHAR_BUDGET).to_string(),
        }
    }
}

/// Count of case-insensitive, non-overlapping occurrences of `term` in `text`.
/// An empty term never matches.
pub fn count_occurrences(text: &str, term: &str) -> usize {
    let term = term.to_lowercase();
    if term.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(term.as_str()).count()
}

/// Keeps the best page seen so far. Only a strictly greater score replaces it.
#[derive(Debug, Default)]
pub struct BestMatch {
    best: Option<SearchResult>,
}

impl BestMatch {
    pub fn offer(&mut self, url: &str, text: &str, term: &str) {
        let score = count_occurrences(text, term);
        let current = self.best.as_ref().map_or(0, |b| b.score);
        if score > current {
            self.best = Some(SearchResult::new(url.to_string(), score, text));
        }
    }

    pub fn into_result(self) -> Option<SearchResult> {
        self.best
    }
}

impl WikiClient {
    /// Scan every page of the wiki `url` belongs to and return the one that
    /// mentions `term` most often. `None` when nothing scores above zero or
    /// the index is unavailable.
    pub async fn find_best_match(&self, url: &str, term: &str) -> Result<Option<SearchResult>> {
        let pages = self.list_pages(url).await?;
        if pages.is_empty() {
            info!("Page index empty, no relevant article");
            return Ok(None);
        }

        info!(term, pages = pages.len(), "Scanning all pages");

        // `buffered` yields in input order, which keeps first-seen tie-breaks.
        let client = self;
        let mut fetched = stream::iter(pages)
            .map(move |page| async move {
                let text = client.fetch_page(&page).await;
                (page, text)
            })
            .buffered(self.concurrency());

        let mut best = BestMatch::default();
        while let Some((page, text)) = fetched.next().await {
            match text {
                Ok(text) => {
                    metrics::record_page("fetched");
                    best.offer(&page, &text, term);
                }
                Err(err) => {
                    metrics::record_page("skipped");
                    debug!(%page, "Skipping page: {}", err);
                }
            }
        }

        let result = best.into_result();
        match &result {
            Some(hit) => info!(url = %hit.url, score = hit.score, "Best match"),
            None => info!(term, "No relevant article found"),
        }
        Ok(result)
    }
}
