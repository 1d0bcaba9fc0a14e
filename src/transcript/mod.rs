//! Append-only conversation transcript.
//!
//! [`TranscriptStore`] owns the ordered log of [`Turn`]s exchanged between
//! the user and the assistant. Turns are immutable once appended; ordering is
//! insertion order and there is no deletion or edit operation. The store is
//! the single owner of turn identity — callers hand it a role and content and
//! get back a fully-formed turn with a fresh id and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lowercase wire/display label (`"user"` / `"assistant"`).
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One recorded utterance in the transcript.
///
/// Immutable once created; constructed only by [`TranscriptStore::append`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Opaque unique token (uuid v4).
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TranscriptStore
// ---------------------------------------------------------------------------

/// Ordered, append-only log of conversation turns.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
}

impl TranscriptStore {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a new turn and return a reference to it.
    ///
    /// The store assigns the id and timestamp; insertion order is the only
    /// ordering.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        let turn = Turn {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        };
        log::debug!("transcript: append {} turn (len={})", turn.role.label(), self.turns.len() + 1);
        self.turns.push(turn);
        self.turns.last().expect("just pushed")
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns recorded so far.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` when no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Snapshot of `(role, content)` pairs, cloned for consumers that run
    /// outside the state lock (the analyzer reads this, never the live log).
    pub fn conversation(&self) -> Vec<(Role, String)> {
        self.turns
            .iter()
            .map(|t| (t.role, t.content.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
