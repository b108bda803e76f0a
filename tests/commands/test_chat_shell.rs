//! Tests for the interactive chat shell

use fandom_ai::commands::chat::{parse_line, ChatShell, ShellCommand};
use fandom_ai::commands::PageTool;
use fandom_ai::config::Backend;
use fandom_ai::{Router, WikiClient};
use httpmock::prelude::*;

#[test]
fn test_exit_and_quit_stop_the_shell() {
    assert_eq!(parse_line("exit"), ShellCommand::Exit);
    assert_eq!(parse_line("QUIT"), ShellCommand::Exit);
}

#[test]
fn test_ask_is_page_question() {
    assert_eq!(
        parse_line("ask who makes honey?"),
        ShellCommand::Tool(PageTool::Ask("who makes honey?".into()))
    );
}

#[tokio::test]
async fn test_fullsearch_reports_best_match() {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Special:AllPages");
        then.status(200).body(
            r#"<ul class="mw-allpages-chunk"><li><a href="/wiki/Royal_Jelly">RJ</a></li></ul>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Royal_Jelly");
        then.status(200)
            .body(r#"<div class="mw-parser-output"><p>Royal jelly is rare.</p></div>"#);
    });

    let router = Router::new(WikiClient::new().unwrap(), None);
    let mut shell = ChatShell::new(router, Backend::LocalRules, &server.url("/wiki/Main"));
    assert!(shell.handle(parse_line("fullsearch jelly")).await);
    shell.finish().await;

    let lines: Vec<String> = shell
        .transcript()
        .snapshot()
        .iter()
        .map(|e| e.to_string())
        .collect();
    assert_eq!(lines[0], "System: Scanning all pages for 'jelly'...");
    assert_eq!(
        lines[1],
        format!(
            "System: Best match: {}\nPreview: Royal jelly is rare....",
            server.url("/wiki/Royal_Jelly")
        )
    );
}

#[tokio::test]
async fn test_summarize_with_local_rules_needs_api_model() {
    let router = Router::new(WikiClient::new().unwrap(), None);
    let mut shell = ChatShell::new(router, Backend::LocalRules, "http://127.0.0.1:9/wiki/Main");
    shell.handle(parse_line("summarize")).await;
    shell.finish().await;

    let entries = shell.transcript().snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].role, "AI");
    assert_eq!(
        entries[0].text,
        "Local AI is not available. Please use an API model."
    );
}
