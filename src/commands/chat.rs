//! Interactive chat shell
//!
//! Every line that is not a shell command is routed on its own task, so a
//! slow full-wiki search never blocks typing. All output goes through the
//! shared transcript and is printed by a single printer task.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::{self, Backend, Config};
use crate::error::Result;
use crate::prompts::API_KEY_REQUIRED;
use crate::router::{classify, find_page_term, Router};
use crate::transcript::{SharedTranscript, ROLE_ERROR, ROLE_LOCAL, ROLE_PAGE_LOADED, ROLE_SYSTEM};
use crate::wiki::{page_url, site_root, WikiClient};

use super::page::{self, PageTool};
use super::pages::{page_preview, render_titles};
use super::{api_key_missing, backend_from_config, search};

pub const HELP: &str = "Commands: summarize | find <term> | ask <question> | fullsearch <term> | \
sections | links | sumsection <section> | infobox | pages | open <title> | wiki <name or url> | \
copy | clear | help | exit\nAnything else is sent to the assistant.";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Help,
    Exit,
    Clear,
    /// Show the last assistant reply again.
    Copy,
    Pages,
    Open(String),
    Wiki(String),
    FullSearch(String),
    Tool(PageTool),
    Utterance(String),
}

/// Parse a line. "find the X page" stays a chat utterance; "find X" is the
/// page tool.
pub fn parse_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let arg = || rest.to_string();

    match (head.to_lowercase().as_str(), rest.is_empty()) {
        ("exit" | "quit", true) => ShellCommand::Exit,
        ("help", true) => ShellCommand::Help,
        ("clear", true) => ShellCommand::Clear,
        ("copy", true) => ShellCommand::Copy,
        ("pages", true) => ShellCommand::Pages,
        ("summarize", true) => ShellCommand::Tool(PageTool::Summarize),
        ("sections", true) => ShellCommand::Tool(PageTool::Sections),
        ("links", true) => ShellCommand::Tool(PageTool::Links),
        ("infobox", true) => ShellCommand::Tool(PageTool::Infobox),
        ("open", false) => ShellCommand::Open(arg()),
        ("wiki", false) => ShellCommand::Wiki(arg()),
        ("fullsearch", false) => ShellCommand::FullSearch(arg()),
        ("find", false) if find_page_term(line).is_none() => {
            ShellCommand::Tool(PageTool::Find(arg()))
        }
        ("ask", false) => ShellCommand::Tool(PageTool::Ask(arg())),
        ("sumsection", false) => ShellCommand::Tool(PageTool::SumSection(arg())),
        _ => ShellCommand::Utterance(line.to_string()),
    }
}

/// Chat state: selected wiki, current page and in-flight workers.
pub struct ChatShell {
    router: Router,
    choice: Backend,
    wiki_url: String,
    page_url: String,
    workers: JoinSet<()>,
}

impl ChatShell {
    pub fn new(router: Router, choice: Backend, wiki_url: &str) -> Self {
        Self {
            router,
            choice,
            wiki_url: wiki_url.to_string(),
            page_url: wiki_url.to_string(),
            workers: JoinSet::new(),
        }
    }

    pub fn wiki_url(&self) -> &str {
        &self.wiki_url
    }

    /// Page the page tools work on: the last opened page or the wiki URL.
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn transcript(&self) -> &SharedTranscript {
        self.router.transcript()
    }

    fn say(&self, role: &str, text: impl Into<String>) {
        self.router.transcript().push(role, text);
    }

    /// Handle one command. Returns `false` once the shell should stop.
    pub async fn handle(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Exit => return false,
            ShellCommand::Help => self.say(ROLE_SYSTEM, HELP),
            ShellCommand::Clear => {
                self.transcript().clear();
                self.say(ROLE_SYSTEM, "Chat cleared.");
            }
            ShellCommand::Copy => match self.transcript().last_reply_text() {
                Some(text) => self.say(ROLE_SYSTEM, format!("Last response:\n{}", text)),
                None => self.say(ROLE_SYSTEM, "No AI response to copy."),
            },
            ShellCommand::Pages => match self.router.wiki().list_titles(&self.wiki_url).await {
                Ok(titles) => self.say(ROLE_SYSTEM, render_titles(&titles)),
                Err(err) => self.say(ROLE_ERROR, format!("Error loading pages: {}", err)),
            },
            ShellCommand::Open(title) => self.open(&title).await,
            ShellCommand::Wiki(target) => self.switch_wiki(&target),
            ShellCommand::FullSearch(term) => self.spawn_search(term),
            ShellCommand::Tool(tool) => self.spawn_tool(tool),
            ShellCommand::Utterance(line) => self.spawn_utterance(line),
        }
        true
    }

    async fn open(&mut self, title: &str) {
        let opened = match site_root(&self.wiki_url) {
            Ok(root) => self
                .router
                .wiki()
                .fetch_page(&page_url(&root, title))
                .await
                .map(|text| (page_url(&root, title), text)),
            Err(err) => Err(err),
        };

        match opened {
            Ok((url, text)) => {
                self.say(ROLE_PAGE_LOADED, page_preview(title, &text));
                self.page_url = url;
            }
            Err(err) => self.say(
                ROLE_ERROR,
                format!("Could not load page: {} ({})", title, err),
            ),
        }
    }

    fn switch_wiki(&mut self, target: &str) {
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            Some(target.to_string())
        } else {
            config::wiki_url(target).map(str::to_string)
        };

        match url {
            Some(url) => {
                info!(%url, "Switched wiki");
                self.say(ROLE_SYSTEM, format!("Wiki set to {}", url));
                self.wiki_url = url.clone();
                self.page_url = url;
            }
            None => self.say(ROLE_ERROR, format!("Unknown wiki: {}", target)),
        }
    }

    fn spawn_search(&mut self, term: String) {
        let router = self.router.clone();
        let url = self.wiki_url.clone();
        self.say(ROLE_SYSTEM, format!("Scanning all pages for '{}'...", term));
        self.workers.spawn(async move {
            let transcript = router.transcript();
            match search::execute(router.wiki(), &url, &term).await {
                Ok(out) => transcript.push(ROLE_SYSTEM, out),
                Err(err) => transcript.push(ROLE_ERROR, format!("Search failed: {}", err)),
            };
        });
    }

    fn spawn_tool(&mut self, tool: PageTool) {
        let router = self.router.clone();
        let url = self.page_url.clone();
        self.workers.spawn(async move {
            let role = match (tool.uses_backend(), router.backend()) {
                (true, Some(backend)) => backend.label(),
                (true, None) => ROLE_LOCAL,
                (false, _) => ROLE_SYSTEM,
            };
            let transcript = router.transcript();
            match page::execute(router.wiki(), router.backend(), &url, &tool).await {
                Ok(out) => transcript.push(role, out),
                Err(err) => transcript.push(
                    ROLE_ERROR,
                    format!("Could not load page: {} ({})", url, err),
                ),
            };
        });
    }

    fn spawn_utterance(&mut self, line: String) {
        if api_key_missing(self.choice, &self.router, &classify(&line)) {
            self.say(ROLE_SYSTEM, API_KEY_REQUIRED);
            return;
        }
        let router = self.router.clone();
        let url = self.wiki_url.clone();
        self.workers.spawn(async move {
            router.route(&line, &url).await;
        });
    }

    /// Wait for every in-flight worker.
    pub async fn finish(&mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(err) = result {
                warn!("Chat worker failed: {}", err);
            }
        }
    }

    /// Cancel in-flight workers without waiting for their replies.
    pub async fn abort(&mut self) {
        let pending = self.workers.len();
        self.workers.shutdown().await;
        if pending > 0 {
            info!(pending, "Cancelled chat workers");
        }
    }
}

pub async fn run(url: &str, choice: Backend) -> Result<()> {
    let config = Config::load();
    let backend = backend_from_config(&config, choice)?;
    if choice.is_remote() && backend.is_none() {
        warn!(
            backend = %choice,
            "No API key configured; only greetings and page tools will work"
        );
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("{}\n", line);
        }
    });

    let transcript = SharedTranscript::with_listener(tx);
    let router = Router::new(WikiClient::new()?, backend).with_transcript(transcript);
    let mut shell = ChatShell::new(router, choice, url);

    println!("Fandom AI chat on {} ({} backend)", url, choice);
    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interrupted = false;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\nStopping chat...");
                interrupted = true;
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !shell.handle(parse_line(&line)).await {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!("Failed to read input: {}", err);
                        break;
                    }
                }
            }
        }
    }

    if interrupted {
        shell.abort().await;
    } else {
        shell.finish().await;
    }
    drop(shell);
    if let Err(err) = printer.await {
        warn!("Printer task failed: {}", err);
    }
    Ok(())
}
