//! HTTP access to a Fandom wiki: single pages and the all-pages index.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use super::extract;
use crate::{Error, Result};

/// Well-known path of the MediaWiki page index.
pub const ALL_PAGES_PATH: &str = "/wiki/Special:AllPages";

/// Per-request timeout for wiki pages.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pages fetched at once during a full scan.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Scheme and host (with port, if any) of `url`, e.g. `https://x.fandom.com`.
pub fn site_root(url: &str) -> Result<String> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| Error::InvalidArgument(format!("Invalid wiki URL {}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("Wiki URL has no host: {}", url)))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// `Special:AllPages` URL for the wiki that `url` belongs to.
pub fn all_pages_url(url: &str) -> Result<String> {
    Ok(format!("{}{}", site_root(url)?, ALL_PAGES_PATH))
}

/// Human title of an article URL: the part after `/wiki/`, decoded,
/// underscores shown as spaces.
pub fn page_title(url: &str) -> String {
    let tail = url.rsplit("/wiki/").next().unwrap_or(url);
    let decoded = urlencoding::decode(tail)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| tail.to_string());
    decoded.replace('_', " ")
}

/// Article URL for a title on the wiki rooted at `root`.
pub fn page_url(root: &str, title: &str) -> String {
    format!(
        "{}/wiki/{}",
        root.trim_end_matches('/'),
        title.trim().replace(' ', "_")
    )
}

/// Fandom wiki client.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
    concurrency: usize,
}

impl WikiClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("fandom_ai/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            concurrency: DEFAULT_SCAN_CONCURRENCY,
        })
    }

    /// Set how many pages a full scan fetches at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// GET `url` and return the body. Non-success status is `NotFound`.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NotFound(format!("{} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read {}: {}", url, e)))
    }

    /// Normalized article text of `url`.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let html = self.fetch_html(url).await?;
        extract::content_text(&html)
    }

    /// Every article URL listed on the wiki's `Special:AllPages`.
    ///
    /// An index that does not answer with success yields an empty list,
    /// which means "index unavailable", not "no pages".
    pub async fn list_pages(&self, url: &str) -> Result<Vec<String>> {
        let root = site_root(url)?;
        let index_url = all_pages_url(&root)?;
        let base = Url::parse(&root)
            .map_err(|e| Error::InvalidArgument(format!("Invalid wiki root {}: {}", root, e)))?;

        let html = match self.fetch_html(&index_url).await {
            Ok(html) => html,
            Err(Error::NotFound(reason)) => {
                warn!("Could not fetch All Pages list: {}", reason);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let pages: Vec<String> = extract::all_pages_hrefs(&html)
            .into_iter()
            .filter_map(|href| match base.join(&href) {
                Ok(abs) => Some(abs.to_string()),
                Err(err) => {
                    debug!(%href, "Skipping unresolvable link: {}", err);
                    None
                }
            })
            .collect();

        info!(root = %root, count = pages.len(), "Loaded page index");
        Ok(pages)
    }

    /// Titles of every page in the index, for browsing.
    pub async fn list_titles(&self, url: &str) -> Result<Vec<String>> {
        Ok(self
            .list_pages(url)
            .await?
            .iter()
            .map(|u| page_title(u))
            .collect())
    }

    /// Fetch the article named `title` on the wiki that `url` belongs to.
    pub async fn open_page(&self, url: &str, title: &str) -> Result<String> {
        let root = site_root(url)?;
        self.fetch_page(&page_url(&root, title)).await
    }
}
