//! Session Store
//!
//! Maps session identifiers to their stage scoreboards. Sessions are created on
//! demand and live until the process exits; there is no deletion and no
//! eviction. Nothing is persisted.

use sdk::errors::EngineError;
use sdk::types::{Stage, StageScoreboard};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Process-wide session registry
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, StageScoreboard>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session with every stage at zero and return its id
    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .insert(session_id.clone(), StageScoreboard::new());
        tracing::info!(session_id = %session_id, "Session created");
        session_id
    }

    /// Snapshot of a session's scoreboard
    ///
    /// # Errors
    /// `EngineError::InvalidSession` when the id was never issued.
    pub fn scoreboard(&self, session_id: &str) -> Result<StageScoreboard, EngineError> {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .get(session_id)
            .cloned()
            .ok_or_else(|| EngineError::InvalidSession(session_id.to_string()))
    }

    /// Increment one stage counter; returns false when the session is unknown
    pub fn record(&self, session_id: &str, stage: Stage) -> bool {
        match self
            .sessions
            .lock()
            .expect("session lock poisoned")
            .get_mut(session_id)
        {
            Some(board) => {
                board.increment(stage);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .contains_key(session_id)
    }

    /// Number of sessions issued so far
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
