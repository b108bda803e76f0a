//! In-memory chat transcript.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;

pub const ROLE_USER: &str = "You";
pub const ROLE_SYSTEM: &str = "System";
pub const ROLE_PAGE_LOADED: &str = "[Page Loaded]";
pub const ROLE_ERROR: &str = "[Error]";
pub const ROLE_LOCAL: &str = "AI";

/// Roles that are never an assistant reply.
const NON_REPLY_ROLES: &[&str] = &[ROLE_USER, ROLE_SYSTEM, ROLE_PAGE_LOADED, ROLE_ERROR];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub role: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.text)
    }
}

/// Append-only list of chat entries.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: Into<String>, T: Into<String>>(&mut self, role: R, text: T) -> &Entry {
        self.entries.push(Entry {
            role: role.into(),
            text: text.into(),
            at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recent assistant reply.
    pub fn last_reply(&self) -> Option<&Entry> {
        self.entries
            .iter()
            .rev()
            .find(|e| !NON_REPLY_ROLES.contains(&e.role.as_str()))
    }
}

#[derive(Debug, Default)]
struct Shared {
    transcript: Mutex<Transcript>,
    listener: Option<UnboundedSender<String>>,
}

/// Transcript shared between concurrent chat workers.
///
/// An optional listener receives every rendered line in append order.
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript(Arc<Shared>);

impl SharedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(listener: UnboundedSender<String>) -> Self {
        Self(Arc::new(Shared {
            transcript: Mutex::new(Transcript::new()),
            listener: Some(listener),
        }))
    }

    /// Lock the transcript. A poisoned lock still yields the data since
    /// entries are only ever appended whole.
    pub fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.0
            .transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append an entry and return its rendered line.
    pub fn push<R: Into<String>, T: Into<String>>(&self, role: R, text: T) -> String {
        let mut transcript = self.lock();
        let line = transcript.push(role, text).to_string();
        if let Some(listener) = &self.0.listener {
            // Receiver gone means nobody is printing any more.
            let _ = listener.send(line.clone());
        }
        line
    }

    pub fn last_reply_text(&self) -> Option<String> {
        self.lock().last_reply().map(|e| e.text.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn snapshot(&self) -> Vec<Entry> {
        self.lock().entries().to_vec()
    }
}
