//! The mutation queue - an ordered log of pending actions.
//!
//! This is a best-effort log, not a transactional journal. Actions are
//! replayed in insertion order; no ordering is guaranteed across
//! collections beyond that.

use crate::{error::Result, Error, QueuedAction};
use serde::{Deserialize, Serialize};

/// Default maximum number of actions the queue will hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Ordered log of mutations not yet confirmed by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationQueue {
    actions: Vec<QueuedAction>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for MutationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationQueue {
    /// Create an empty queue with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create an empty queue with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            actions: Vec::new(),
            capacity,
        }
    }

    /// Rebuild a queue from previously persisted actions.
    pub fn from_actions(actions: Vec<QueuedAction>, capacity: usize) -> Self {
        Self { actions, capacity }
    }

    /// Append an action to the queue.
    ///
    /// Fails only when the queue is at capacity, in which case the action
    /// is dropped and [`Error::StorageFull`] is returned. The caller must
    /// surface that to the user - a silently lost mutation is unacceptable.
    pub fn enqueue(&mut self, action: QueuedAction) -> Result<()> {
        if self.actions.len() >= self.capacity {
            return Err(Error::StorageFull {
                capacity: self.capacity,
            });
        }
        self.actions.push(action);
        Ok(())
    }

    /// The full ordered sequence of pending actions.
    ///
    /// Read-only peek for replay; nothing is removed.
    pub fn pending(&self) -> &[QueuedAction] {
        &self.actions
    }

    /// Remove an action by id. Idempotent: removing a nonexistent id is a
    /// no-op, not an error.
    pub fn remove(&mut self, action_id: &str) {
        self.actions.retain(|a| a.id != action_id);
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the queue has no pending actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Maximum number of actions the queue will hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
