//! Fandom wiki access: page fetching, index scanning, extraction and search.

pub mod client;
pub mod extract;
pub mod search;

pub use client::{all_pages_url, page_title, page_url, site_root, WikiClient};
pub use search::{count_occurrences, SearchResult};
