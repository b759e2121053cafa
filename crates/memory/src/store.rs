//! In-memory conversation store with per-user serialization.
//!
//! The outer map is guarded by a `std::sync::Mutex` that is only held for
//! lookup, insert, and eviction (never across an `.await`). Each conversation
//! sits behind its own `tokio::sync::Mutex`, so two requests for the same
//! user run one after the other while unrelated users proceed in parallel.

use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskbot_core::error::MemoryError;
use taskbot_core::message::{Conversation, Role, Turn};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

type Slot = Arc<AsyncMutex<Conversation>>;

/// Process-wide mapping from user identifier to conversation.
pub struct ConversationStore {
    sessions: Mutex<HashMap<String, Slot>>,
    max_turns: usize,
    max_users: usize,
}

impl ConversationStore {
    /// Create a store keeping `max_turns` turns per user and at most
    /// `max_users` distinct users.
    pub fn new(max_turns: usize, max_users: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns: max_turns.max(1),
            max_users: max_users.max(1),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Lock the conversation for `user_id`, creating it if absent.
    ///
    /// The returned guard holds the per-user lock until dropped. Fails only
    /// when the store is at capacity and every stored conversation is in use.
    pub async fn session(&self, user_id: &str) -> Result<SessionGuard, MemoryError> {
        let slot = self.slot(user_id)?;
        let guard = slot.lock_owned().await;
        Ok(SessionGuard {
            conversation: guard,
        })
    }

    /// Append a turn for `user_id` (creating the conversation if absent).
    pub async fn append(
        &self,
        user_id: &str,
        role: Role,
        text: impl Into<String>,
    ) -> Result<(), MemoryError> {
        let mut session = self.session(user_id).await?;
        session.append(role, text);
        Ok(())
    }

    /// Snapshot of the stored turns for `user_id`, oldest first.
    ///
    /// Does not create a conversation for an unknown user.
    pub async fn history(&self, user_id: &str) -> Vec<Turn> {
        let slot = self.lock_map().get(user_id).cloned();
        match slot {
            Some(slot) => slot.lock().await.turns().to_vec(),
            None => Vec::new(),
        }
    }

    /// Number of distinct users currently stored.
    pub fn len(&self) -> usize {
        self.lock_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_map().is_empty()
    }

    /// Remove conversations idle for longer than `ttl`.
    ///
    /// Conversations held or awaited by a request are never removed.
    /// Returns the number of conversations removed.
    pub fn purge_idle(&self, ttl: Duration) -> usize {
        let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = Utc::now().checked_sub_signed(delta) else {
            return 0;
        };

        let mut sessions = self.lock_map();
        let before = sessions.len();
        sessions.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(conv) => conv.last_activity() > cutoff,
                Err(_) => true,
            }
        });
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(
                removed,
                remaining = sessions.len(),
                "Purged idle conversations"
            );
        }
        removed
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Find or create the slot for `user_id`, evicting the least recently
    /// active idle user when a new one would exceed capacity.
    fn slot(&self, user_id: &str) -> Result<Slot, MemoryError> {
        let mut sessions = self.lock_map();

        if let Some(slot) = sessions.get(user_id) {
            return Ok(slot.clone());
        }

        if sessions.len() >= self.max_users {
            let victim = sessions
                .iter()
                .filter(|(_, slot)| Arc::strong_count(slot) == 1)
                .filter_map(|(key, slot)| {
                    slot.try_lock()
                        .ok()
                        .map(|conv| (key.clone(), conv.last_activity()))
                })
                .min_by_key(|(_, last)| *last)
                .map(|(key, _)| key);

            match victim {
                Some(key) => {
                    debug!(evicted = %key, "Conversation store full, evicting least recent user");
                    sessions.remove(&key);
                }
                None => {
                    return Err(MemoryError::CapacityExhausted {
                        capacity: self.max_users,
                    });
                }
            }
        }

        let slot = Arc::new(AsyncMutex::new(Conversation::new(self.max_turns)));
        sessions.insert(user_id.to_string(), slot.clone());
        Ok(slot)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(10, 10_000)
    }
}

/// Exclusive access to one user's conversation.
pub struct SessionGuard {
    conversation: OwnedMutexGuard<Conversation>,
}

impl SessionGuard {
    /// Append a turn; the conversation trims itself to its cap.
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.conversation.push(Turn::new(role, text));
    }

    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        self.conversation.recent(n)
    }

    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }
}
