//! Chat transcript
//!
//! With [`TranscriptScope::Shared`] (the default) every session appends to and
//! sends the same ordered list of turns, so all sessions talk to the model as a
//! single combined conversation and only the scoreboards are per session.
//! [`TranscriptScope::Session`] keeps one list per session identifier instead.
//!
//! The lock is held only while appending or copying; callers must not keep it
//! across a model call.

use crate::config::TranscriptScope;
use crate::llm::Message;
use std::collections::HashMap;
use std::sync::Mutex;

/// Key used for the single shared conversation
const SHARED_KEY: &str = "";

pub struct ChatTranscript {
    scope: TranscriptScope,
    turns: Mutex<HashMap<String, Vec<Message>>>,
}

impl ChatTranscript {
    pub fn new(scope: TranscriptScope) -> Self {
        Self {
            scope,
            turns: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> TranscriptScope {
        self.scope
    }

    fn key<'a>(&self, session_id: &'a str) -> &'a str {
        match self.scope {
            TranscriptScope::Shared => SHARED_KEY,
            TranscriptScope::Session => session_id,
        }
    }

    /// Append a turn to the conversation `session_id` belongs to
    pub fn append(&self, session_id: &str, message: Message) {
        self.turns
            .lock()
            .expect("transcript lock poisoned")
            .entry(self.key(session_id).to_string())
            .or_default()
            .push(message);
    }

    /// Append a turn and return a copy of the conversation including it
    pub fn append_and_snapshot(&self, session_id: &str, message: Message) -> Vec<Message> {
        let mut turns = self.turns.lock().expect("transcript lock poisoned");
        let conversation = turns.entry(self.key(session_id).to_string()).or_default();
        conversation.push(message);
        conversation.clone()
    }

    /// Copy of the conversation `session_id` belongs to, oldest first
    pub fn snapshot(&self, session_id: &str) -> Vec<Message> {
        self.turns
            .lock()
            .expect("transcript lock poisoned")
            .get(self.key(session_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of turns across all conversations
    pub fn len(&self) -> usize {
        self.turns
            .lock()
            .expect("transcript lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new(TranscriptScope::default())
    }
}
