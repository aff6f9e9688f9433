//! Conversation sessions.
//!
//! A [`Session`] is an explicit context object: created when a conversation
//! starts, passed into every interaction, and dropped when the conversation
//! ends. Its transcript is append-only and never written to disk.
//!
//! The HTTP server keeps many sessions alive at once in a
//! [`SessionRegistry`]; the terminal chat owns exactly one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Role, Turn};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            turns: Vec::new(),
        };
        tracing::debug!(session = %session.id, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append one turn. There is no size bound.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    /// Full transcript, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Live sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session and return its id.
    pub fn start(&mut self) -> Uuid {
        let session = Session::new();
        let id = session.id();
        self.sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Tear down a session. Returns `false` if it did not exist.
    pub fn end(&mut self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some(session) => {
                tracing::debug!(session = %id, turns = session.len(), "session ended");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
