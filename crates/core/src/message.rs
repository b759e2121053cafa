//! Turn and Conversation domain types.
//!
//! A user sends a message → it is recorded as a [`Turn`] → the reply comes
//! back as another turn in the same [`Conversation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant (AI or canned fallback)
    Bot,
}

/// A single message in a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a bot turn.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An ordered, size-capped sequence of turns for one user.
///
/// After every push only the newest `max_turns` turns are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
    max_turns: usize,
    last_activity: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation keeping at most `max_turns` turns.
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
            last_activity: Utc::now(),
        }
    }

    /// Append a turn, then drop the oldest turns beyond the cap.
    pub fn push(&mut self, turn: Turn) {
        self.last_activity = Utc::now();
        self.turns.push(turn);
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }

    /// All stored turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The last `n` turns (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// When the last turn was pushed (or creation time if none).
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}
