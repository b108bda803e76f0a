//! Command implementations
//!
//! All `fandom_ai` CLI commands are implemented here.
//! Each module corresponds to a subcommand in the CLI.

pub mod ask;
pub mod chat;
pub mod page;
pub mod pages;
pub mod search;
pub mod settings;
pub mod wikis;

// Re-export commonly used types
pub use ask::run as ask_run;
pub use chat::run as chat_run;
pub use page::PageTool;
pub use search::run as search_run;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::integrations::ChatBackend;
use crate::router::{Intent, Router};

/// Build the selected backend from the keys in `config`.
pub fn backend_from_config(config: &Config, backend: Backend) -> Result<Option<ChatBackend>> {
    ChatBackend::from_selection(backend, config.api_key_for(backend))
}

/// A remote backend was chosen but has no key, and `intent` needs it.
pub fn api_key_missing(choice: Backend, router: &Router, intent: &Intent) -> bool {
    choice.is_remote() && router.backend().is_none() && intent.needs_backend()
}
