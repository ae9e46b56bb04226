//! Per-session conversation state.
//!
//! Sessions are created lazily on first message and never expire (an
//! eviction policy is a known open item; unbounded history is a
//! resource limit, not a correctness bug). The store hands out each
//! session behind its own `tokio::sync::Mutex`: the orchestrator holds
//! that lock across its read-history → append sequence, which
//! serializes requests per session id without ordering anything across
//! different sessions.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::models::Turn;

/// Ordered, append-only turn history for one session.
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    /// Full turn history, oldest first. No truncation or windowing.
    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    /// Append one question/answer turn.
    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Concurrent map of session id to session state.
///
/// Exclusively owns every [`Session`]; no other component mutates one.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: DashMap<String, Arc<Mutex<Session>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `id`, creating an empty one if absent.
    ///
    /// Two concurrent first-messages for the same new id resolve to the
    /// same `Session` object: the map's entry API makes insertion
    /// atomic per key.
    pub fn get_or_create(&self, id: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(id.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
