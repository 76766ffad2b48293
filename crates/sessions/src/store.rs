use std::sync::Arc;

use {dashmap::DashMap, tokio::sync::Mutex};

use crate::session::Session;

/// Sessions keyed by conversation id.
///
/// Each conversation gets one shared `Arc<Mutex<Session>>`: holding the
/// lock across a dispatch call is how the host enforces the
/// single-writer-per-conversation discipline the engine assumes. Distinct
/// conversations lock independently and proceed concurrently.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for a conversation, created empty on first sight.
    pub fn session(&self, conversation: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(conversation.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    /// Forget a conversation entirely. Returns whether it existed.
    pub fn remove(&self, conversation: &str) -> bool {
        self.sessions.remove(conversation).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
