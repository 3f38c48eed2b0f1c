//! Queued actions - durable records of pending mutations.
//!
//! Mutations are logged as actions, not applied fire-and-forget. An action
//! stays queued until the remote store acknowledges the corresponding
//! operation, which is what makes offline-first replay possible.

use crate::{ActionId, EntityKind, Record, Timestamp};
use serde::{Deserialize, Serialize};

/// What a queued action does to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl ActionKind {
    /// Wire/audit name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending mutation awaiting confirmed application to the remote store.
///
/// Lifecycle: created when a mutation occurs while remote durability cannot
/// be confirmed; removed from the queue only after the remote operation is
/// acknowledged; otherwise retained indefinitely across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    /// Unique identifier of the action itself
    pub id: ActionId,
    /// Which entity collection the mutation targets
    pub entity: EntityKind,
    /// Create, update, or delete
    pub action: ActionKind,
    /// The record payload; for deletes only `data.id` is meaningful
    pub data: Record,
    /// When the action was queued
    pub created_at: Timestamp,
}

impl QueuedAction {
    /// Create a new queued action.
    pub fn new(
        id: impl Into<ActionId>,
        entity: EntityKind,
        action: ActionKind,
        data: Record,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            entity,
            action,
            data,
            created_at,
        }
    }
}
