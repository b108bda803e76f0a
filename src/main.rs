//! Fandom AI CLI - main entry point
//!
//! Chat with Fandom wikis, search a whole wiki for the best article and
//! inspect single pages from the terminal.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use fandom_ai::commands::{self, PageTool};
use fandom_ai::config::{resolve_wiki_url, Backend};
use fandom_ai::wiki::client::DEFAULT_SCAN_CONCURRENCY;
use fandom_ai::{metrics, Config};
use tracing::warn;

#[derive(Parser)]
#[command(name = "fandom_ai")]
#[command(about = "Fandom wiki assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Which wiki to work on.
#[derive(Args, Clone)]
struct WikiArgs {
    /// Built-in wiki name (see `fandom_ai wikis`)
    #[arg(long)]
    wiki: Option<String>,

    /// Any Fandom/MediaWiki page URL (wins over --wiki)
    #[arg(long, env = "FANDOM_URL")]
    url: Option<String>,
}

impl WikiArgs {
    fn resolve(&self) -> anyhow::Result<String> {
        Ok(resolve_wiki_url(self.wiki.as_deref(), self.url.as_deref())?)
    }
}

#[derive(Args, Clone)]
struct BackendArgs {
    /// Chat backend: openai | gemini | claude | local
    #[arg(long, default_value = "openai")]
    backend: Backend,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with the selected wiki
    Chat {
        #[command(flatten)]
        wiki: WikiArgs,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Route a single question like a chat line
    Ask {
        /// Question or request (e.g. "find the bee page")
        utterance: Vec<String>,

        #[command(flatten)]
        wiki: WikiArgs,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// Scan every page of the wiki for the best match
    Search {
        /// Search term
        term: String,

        /// Pages fetched at once
        #[arg(short, long, default_value_t = DEFAULT_SCAN_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// List page titles of the wiki, or open one
    Pages {
        /// Open the page with this title
        #[arg(long)]
        open: Option<String>,

        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// List section headings of a page
    Sections {
        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// List internal wiki links of a page
    Links {
        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// Show infobox rows of a page
    Infobox {
        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// Check whether a page mentions a term
    Find {
        term: String,

        #[command(flatten)]
        wiki: WikiArgs,
    },

    /// Summarize a page, or one of its sections
    Summarize {
        /// Section heading to summarize
        #[arg(long)]
        section: Option<String>,

        #[command(flatten)]
        wiki: WikiArgs,

        #[command(flatten)]
        backend: BackendArgs,
    },

    /// List built-in wikis
    Wikis,

    /// Show or change stored API keys
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show configured keys (masked)
    Show,
    /// Store an API key in the settings file
    SetKey {
        /// openai | gemini | claude
        provider: String,
        key: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Chat { .. } => "chat",
            Commands::Ask { .. } => "ask",
            Commands::Search { .. } => "search",
            Commands::Pages { .. } => "pages",
            Commands::Sections { .. } => "sections",
            Commands::Links { .. } => "links",
            Commands::Infobox { .. } => "infobox",
            Commands::Find { .. } => "find",
            Commands::Summarize { .. } => "summarize",
            Commands::Wikis => "wikis",
            Commands::Config { .. } => "config",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Logs go to stderr so chat output stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fandom_ai=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let command_name = cli.command.name();
    metrics::record_command_start(command_name);
    let start = Instant::now();

    let result = execute_command(cli.command).await;

    metrics::record_command_result(command_name, start.elapsed(), result.is_ok());

    result
}

async fn execute_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Chat { wiki, backend } => {
            commands::chat::run(&wiki.resolve()?, backend.backend).await?;
        }
        Commands::Ask {
            utterance,
            wiki,
            backend,
        } => {
            let utterance = utterance.join(" ");
            if utterance.trim().is_empty() {
                anyhow::bail!("Nothing to ask");
            }
            commands::ask::run(&wiki.resolve()?, backend.backend, &utterance).await?;
        }
        Commands::Search {
            term,
            concurrency,
            wiki,
        } => {
            commands::search::run(&wiki.resolve()?, &term, concurrency).await?;
        }
        Commands::Pages { open, wiki } => {
            commands::pages::run(&wiki.resolve()?, open.as_deref()).await?;
        }
        Commands::Sections { wiki } => {
            commands::page::run(&wiki.resolve()?, PageTool::Sections, None).await?;
        }
        Commands::Links { wiki } => {
            commands::page::run(&wiki.resolve()?, PageTool::Links, None).await?;
        }
        Commands::Infobox { wiki } => {
            commands::page::run(&wiki.resolve()?, PageTool::Infobox, None).await?;
        }
        Commands::Find { term, wiki } => {
            commands::page::run(&wiki.resolve()?, PageTool::Find(term), None).await?;
        }
        Commands::Summarize {
            section,
            wiki,
            backend,
        } => {
            let config = Config::load();
            let chat = commands::backend_from_config(&config, backend.backend)?;
            let tool = match section {
                Some(name) => PageTool::SumSection(name),
                None => PageTool::Summarize,
            };
            commands::page::run(&wiki.resolve()?, tool, chat).await?;
        }
        Commands::Wikis => {
            commands::wikis::run();
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::settings::show(),
            ConfigAction::SetKey { provider, key } => {
                commands::settings::run_set_key(&provider, &key)?;
            }
        },
    }

    Ok(())
}
