//! One-shot question routed like a chat line

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::prompts::API_KEY_REQUIRED;
use crate::router::{classify, Reply, Router};
use crate::transcript::ROLE_SYSTEM;
use crate::wiki::WikiClient;

use super::{api_key_missing, backend_from_config};

/// Route `utterance`, or refuse when the chosen backend has no key.
pub async fn execute(router: &Router, choice: Backend, url: &str, utterance: &str) -> Reply {
    if api_key_missing(choice, router, &classify(utterance)) {
        return Reply {
            role: ROLE_SYSTEM.to_string(),
            text: API_KEY_REQUIRED.to_string(),
        };
    }
    router.route(utterance, url).await
}

pub async fn run(url: &str, choice: Backend, utterance: &str) -> Result<()> {
    let config = Config::load();
    let backend = backend_from_config(&config, choice)?;
    let router = Router::new(WikiClient::new()?, backend);

    let reply = execute(&router, choice, url, utterance).await;
    println!("{}: {}", reply.role, reply.text);
    Ok(())
}
