//! Intent detection and dispatch for chat utterances.
//!
//! Rules are checked in a fixed order and the first match wins:
//! greeting, farewell, thanks, explicit "find ... page" search, then a
//! general question answered from the wiki's main page.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::integrations::{ChatBackend, ChatMessage};
use crate::prompts::{self, Prompt};
use crate::transcript::{SharedTranscript, ROLE_ERROR, ROLE_LOCAL, ROLE_SYSTEM, ROLE_USER};
use crate::wiki::WikiClient;

const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];
const FAREWELLS: &[&str] = &["bye", "goodbye", "see you", "later", "cya"];
const THANKS: &[&str] = &["thanks", "thank you", "thx", "appreciate it"];

static FIND_PAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)find\s+(?:the\s+)?(?P<term>.+?)\s+page").expect("valid find-page regex")
});

/// Classified purpose of an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Farewell,
    Thanks,
    /// Full-wiki search for the captured term.
    PageSearch(String),
    General,
}

impl Intent {
    /// Whether answering needs a remote backend (small talk has canned replies).
    pub fn needs_backend(&self) -> bool {
        matches!(self, Intent::PageSearch(_) | Intent::General)
    }

    fn canned_reply(&self) -> Option<&'static str> {
        match self {
            Intent::Greeting => Some(prompts::GREETING_REPLY),
            Intent::Farewell => Some(prompts::FAREWELL_REPLY),
            Intent::Thanks => Some(prompts::THANKS_REPLY),
            Intent::PageSearch(_) | Intent::General => None,
        }
    }
}

/// Case-insensitive containment of any phrase, inside words too ("hiya").
fn has_phrase(lowered: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| lowered.contains(p))
}

/// Extract the search term of a "find [the] <term> page" request.
pub fn find_page_term(utterance: &str) -> Option<String> {
    FIND_PAGE
        .captures(utterance)
        .and_then(|caps| caps.name("term"))
        .map(|m| m.as_str().trim().to_string())
        .filter(|term| !term.is_empty())
}

/// Classify an utterance; see the module docs for rule order.
pub fn classify(utterance: &str) -> Intent {
    let lowered = utterance.to_lowercase();
    if has_phrase(&lowered, GREETINGS) {
        Intent::Greeting
    } else if has_phrase(&lowered, FAREWELLS) {
        Intent::Farewell
    } else if has_phrase(&lowered, THANKS) {
        Intent::Thanks
    } else if let Some(term) = find_page_term(utterance) {
        Intent::PageSearch(term)
    } else {
        Intent::General
    }
}

/// Answer to one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Speaker label: backend label, `AI` for canned replies, `[Error]`.
    pub role: String,
    pub text: String,
}

impl Reply {
    fn new<R: Into<String>, T: Into<String>>(role: R, text: T) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// Dispatches utterances to canned replies, the wiki and a chat backend.
#[derive(Debug, Clone)]
pub struct Router {
    wiki: WikiClient,
    backend: Option<ChatBackend>,
    transcript: SharedTranscript,
}

impl Router {
    pub fn new(wiki: WikiClient, backend: Option<ChatBackend>) -> Self {
        Self {
            wiki,
            backend,
            transcript: SharedTranscript::new(),
        }
    }

    /// Record into an existing transcript instead of a private one.
    pub fn with_transcript(mut self, transcript: SharedTranscript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn transcript(&self) -> &SharedTranscript {
        &self.transcript
    }

    pub fn backend(&self) -> Option<&ChatBackend> {
        self.backend.as_ref()
    }

    pub fn wiki(&self) -> &WikiClient {
        &self.wiki
    }

    /// Answer `utterance` about the wiki at `wiki_url`. Appends the
    /// utterance and the reply to the transcript.
    pub async fn route(&self, utterance: &str, wiki_url: &str) -> Reply {
        self.transcript.push(ROLE_USER, utterance);

        let intent = classify(utterance);
        debug!(?intent, "Classified utterance");

        let reply = match intent {
            Intent::Greeting | Intent::Farewell | Intent::Thanks => {
                self.small_talk(&intent, utterance).await
            }
            Intent::PageSearch(term) => self.page_search(utterance, &term, wiki_url).await,
            Intent::General => self.general(utterance, wiki_url).await,
        };

        self.transcript.push(reply.role.as_str(), reply.text.as_str());
        reply
    }

    async fn small_talk(&self, intent: &Intent, utterance: &str) -> Reply {
        match (&self.backend, intent.canned_reply()) {
            (Some(backend), _) => {
                let messages = [
                    ChatMessage::system(Prompt::Casual.text()),
                    ChatMessage::user(utterance),
                ];
                Reply::new(backend.label(), backend.send(&messages).await)
            }
            (None, Some(canned)) => Reply::new(ROLE_LOCAL, canned),
            (None, None) => Reply::new(ROLE_LOCAL, prompts::LOCAL_AI_UNAVAILABLE),
        }
    }

    async fn page_search(&self, utterance: &str, term: &str, wiki_url: &str) -> Reply {
        let Some(backend) = &self.backend else {
            return Reply::new(ROLE_LOCAL, prompts::LOCAL_AI_UNAVAILABLE);
        };

        self.transcript.push(
            ROLE_SYSTEM,
            format!("Searching all pages for '{}'...", term),
        );
        info!(term, "Page search requested");

        match self.wiki.find_best_match(wiki_url, term).await {
            Ok(Some(hit)) => {
                let prompt = prompts::best_match_prompt(utterance, &hit.url, &hit.excerpt);
                let messages = [
                    ChatMessage::system(Prompt::WikiExpert.text()),
                    ChatMessage::user(prompt),
                ];
                Reply::new(backend.label(), backend.send(&messages).await)
            }
            Ok(None) => Reply::new(backend.label(), prompts::NO_RELEVANT_ARTICLE),
            Err(err) => Reply::new(
                ROLE_ERROR,
                format!("Could not load the page index: {}", err),
            ),
        }
    }

    async fn general(&self, utterance: &str, wiki_url: &str) -> Reply {
        let Some(backend) = &self.backend else {
            return Reply::new(ROLE_LOCAL, prompts::LOCAL_AI_UNAVAILABLE);
        };

        let text = match self.wiki.fetch_page(wiki_url).await {
            Ok(text) => text,
            Err(err) => {
                debug!(wiki_url, "Main page unavailable: {}", err);
                return Reply::new(backend.label(), prompts::MAIN_PAGE_UNAVAILABLE);
            }
        };

        let messages = [
            ChatMessage::system(Prompt::WikiExpert.text()),
            ChatMessage::user(prompts::main_page_prompt(utterance, &text)),
        ];
        Reply::new(backend.label(), backend.send(&messages).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{ClaudeClient, GeminiClient, OpenAIClient};
    use httpmock::prelude::*;
    use serde_json::json;

    fn article(body: &str) -> String {
        format!(
            r#"<html><body><div class="mw-parser-output"><p>{}</p></div></body></html>"#,
            body
        )
    }

    fn openai(server: &MockServer) -> ChatBackend {
        ChatBackend::OpenAI(
            OpenAIClient::new("k")
                .unwrap()
                .with_base_url(&server.base_url()),
        )
    }

    #[test]
    fn classify_small_talk() {
        assert_eq!(classify("hello there"), Intent::Greeting);
        assert_eq!(classify("Good Morning!"), Intent::Greeting);
        assert_eq!(classify("ok bye"), Intent::Farewell);
        assert_eq!(classify("see you soon"), Intent::Farewell);
        assert_eq!(classify("thank you so much"), Intent::Thanks);
    }

    #[test]
    fn classify_matches_phrases_inside_words() {
        assert_eq!(classify("hiya"), Intent::Greeting);
        assert_eq!(classify("HELLOOO"), Intent::Greeting);
        assert_eq!(classify("heyyy there"), Intent::Greeting);
        assert_eq!(classify("which bee is best?"), Intent::Greeting);
        assert_eq!(classify("thanksss"), Intent::Thanks);
        assert_eq!(classify("what is a Windy Bee?"), Intent::General);
    }

    #[test]
    fn classify_find_page() {
        assert_eq!(
            classify("find the bee page"),
            Intent::PageSearch("bee".to_string())
        );
        assert_eq!(
            classify("Please FIND Windy Bee page"),
            Intent::PageSearch("Windy Bee".to_string())
        );
        assert_eq!(classify("find bees"), Intent::General);
    }

    #[test]
    fn classify_priority_greeting_beats_page_search() {
        assert_eq!(classify("hello, find the bee page"), Intent::Greeting);
        assert_eq!(classify("thanks, find the bee page"), Intent::Thanks);
    }

    #[test]
    fn intents_needing_backend() {
        assert!(!Intent::Greeting.needs_backend());
        assert!(!Intent::Thanks.needs_backend());
        assert!(Intent::General.needs_backend());
        assert!(Intent::PageSearch("x".into()).needs_backend());
    }

    #[tokio::test]
    async fn greeting_without_backend_is_canned_and_offline() {
        let router = Router::new(WikiClient::new().unwrap(), None);
        let reply = router
            .route("hello there", "http://127.0.0.1:9/wiki/Main")
            .await;

        assert_eq!(reply.role, ROLE_LOCAL);
        assert_eq!(reply.text, prompts::GREETING_REPLY);

        let entries = router.transcript().snapshot();
        assert_eq!(entries[0].to_string(), "You: hello there");
        assert_eq!(entries[1].text, prompts::GREETING_REPLY);
    }

    #[tokio::test]
    async fn farewell_and_thanks_without_backend() {
        let router = Router::new(WikiClient::new().unwrap(), None);
        assert_eq!(
            router.route("bye", "http://127.0.0.1:9").await.text,
            prompts::FAREWELL_REPLY
        );
        assert_eq!(
            router.route("thx", "http://127.0.0.1:9").await.text,
            prompts::THANKS_REPLY
        );
    }

    #[tokio::test]
    async fn greeting_with_backend_forwards_casual_prompt() {
        let server = MockServer::start_async().await;
        let chat = server.mock(|when, then| {
            when.method(POST).path("/chat/completions").is_true(|req| {
                let body = String::from_utf8_lossy(req.body().as_ref());
                body.contains("chat casually") && body.contains("hey you")
            });
            then.status(200).json_body(json!({
                "choices": [ { "message": { "content": "Hey! Ask me anything." } } ]
            }));
        });

        let router = Router::new(WikiClient::new().unwrap(), Some(openai(&server)));
        let reply = router.route("hey you", &server.base_url()).await;

        assert_eq!(reply.role, "ChatGPT");
        assert_eq!(reply.text, "Hey! Ask me anything.");
        chat.assert_calls(1);
    }

    #[tokio::test]
    async fn page_search_embeds_best_match() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Special:AllPages");
            then.status(200).body(
                r#"<ul class="mw-allpages-chunk">
                     <li><a href="/wiki/Ant">a</a></li>
                     <li><a href="/wiki/Bee">b</a></li>
                   </ul>"#,
            );
        });
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Ant");
            then.status(200).body(article("ants"));
        });
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Bee");
            then.status(200).body(article("BEE_PAGE_TEXT about bees"));
        });
        let chat = server.mock(|when, then| {
            when.method(POST).path("/messages").is_true(|req| {
                let body = String::from_utf8_lossy(req.body().as_ref());
                body.contains("BEE_PAGE_TEXT") && body.contains("/wiki/Bee")
            });
            then.status(200).json_body(json!({
                "content": [ { "type": "text", "text": "Bees are great." } ]
            }));
        });

        let backend = ChatBackend::Claude(
            ClaudeClient::new("k")
                .unwrap()
                .with_base_url(&server.base_url()),
        );
        let router = Router::new(WikiClient::new().unwrap(), Some(backend));
        let reply = router
            .route("find the bee page", &server.url("/wiki/Main"))
            .await;

        assert_eq!(reply.role, "Claude");
        assert_eq!(reply.text, "Bees are great.");
        chat.assert_calls(1);

        let lines: Vec<String> = router
            .transcript()
            .snapshot()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(lines[1], "System: Searching all pages for 'bee'...");
        assert_eq!(lines[2], "Claude: Bees are great.");
    }

    #[tokio::test]
    async fn page_search_miss_reports_no_article_without_chat() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Special:AllPages");
            then.status(500);
        });
        let chat = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200);
        });

        let router = Router::new(WikiClient::new().unwrap(), Some(openai(&server)));
        let reply = router
            .route("find the bee page", &server.base_url())
            .await;

        assert_eq!(reply.text, prompts::NO_RELEVANT_ARTICLE);
        chat.assert_calls(0);
    }

    #[tokio::test]
    async fn general_question_uses_truncated_main_page() {
        let server = MockServer::start_async().await;
        let long_text = format!("START{}", "x".repeat(5000));
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Main");
            then.status(200).body(article(&long_text));
        });
        let chat = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-pro:generateContent")
                .is_true(|req| {
                    let body = String::from_utf8_lossy(req.body().as_ref());
                    let xs = body.matches('x').count();
                    body.contains("START") && body.contains("what is a Windy Bee?") && xs < 2100
                });
            then.status(200).json_body(json!({
                "candidates": [ { "content": { "parts": [ { "text": "A bee." } ] } } ]
            }));
        });

        let backend = ChatBackend::Gemini(
            GeminiClient::new("k")
                .unwrap()
                .with_base_url(&server.base_url()),
        );
        let router = Router::new(WikiClient::new().unwrap(), Some(backend));
        let reply = router
            .route("what is a Windy Bee?", &server.url("/wiki/Main"))
            .await;

        assert_eq!(reply.role, "Gemini");
        assert_eq!(reply.text, "A bee.");
        chat.assert_calls(1);
    }

    #[tokio::test]
    async fn general_question_main_page_unavailable() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/wiki/Main");
            then.status(404);
        });

        let router = Router::new(WikiClient::new().unwrap(), Some(openai(&server)));
        let reply = router
            .route("what is the wiki about", &server.url("/wiki/Main"))
            .await;
        assert_eq!(reply.text, prompts::MAIN_PAGE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn general_question_without_backend_is_local_notice() {
        let router = Router::new(WikiClient::new().unwrap(), None);
        let reply = router.route("what is honey", "http://127.0.0.1:9").await;
        assert_eq!(reply.text, prompts::LOCAL_AI_UNAVAILABLE);
    }

    #[tokio::test]
    async fn provider_failure_is_inline_reply() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).body("bad key");
        });

        let router = Router::new(WikiClient::new().unwrap(), Some(openai(&server)));
        let reply = router.route("hi", &server.base_url()).await;
        assert!(reply.text.starts_with("[OpenAI error:"));
    }
}
