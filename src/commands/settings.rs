//! API key settings

use std::path::Path;

use tracing::info;

use crate::config::{mask_key, Backend, Config};
use crate::error::Result;

/// Masked key overview for every remote backend.
pub fn render(config: &Config, path: &Path) -> String {
    let mut out = format!("Settings file: {}", path.display());
    for backend in [Backend::OpenAI, Backend::Gemini, Backend::Claude] {
        out.push_str(&format!(
            "\n{:<8} {}",
            backend.provider_name(),
            mask_key(config.api_key_for(backend).unwrap_or_default())
        ));
    }
    out
}

/// Store `key` for `provider` in the settings file at `path`.
///
/// Only the file contents are rewritten; keys coming from the environment
/// are never persisted.
pub fn set_key(path: &Path, provider: &str, key: &str) -> Result<Config> {
    let backend: Backend = provider.parse()?;
    let mut config = Config::load_or_default(path);
    config.set_api_key(backend, key)?;
    config.save_to_file(path)?;
    info!(provider = backend.provider_name(), path = %path.display(), "Saved API key");
    Ok(config)
}

pub fn show() {
    let path = Config::default_path();
    println!("{}", render(&Config::load(), &path));
}

pub fn run_set_key(provider: &str, key: &str) -> Result<()> {
    let path = Config::default_path();
    set_key(&path, provider, key)?;
    println!("Saved {} key to {}", provider, path.display());
    Ok(())
}
