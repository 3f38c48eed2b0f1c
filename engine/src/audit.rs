//! Append-only audit log of user actions.
//!
//! Purely observational: the audit log never participates in
//! reconciliation and must never block or crash the primary workflow.

use crate::{EntityKind, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries retained; oldest are evicted first.
pub const MAX_AUDIT_ENTRIES: usize = 1000;

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub user_id: String,
    pub username: String,
    /// What the user did, e.g. "create", "refund", "stock-adjust"
    pub action: String,
    pub entity_type: EntityKind,
    pub entity_id: RecordId,
    /// Free-form context for the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: Timestamp,
}

/// Bounded FIFO log of audit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from persisted entries, enforcing the retention cap.
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        let mut log = Self {
            entries: entries.into(),
        };
        log.evict();
        log
    }

    /// Append an entry, evicting the oldest entries past the cap.
    pub fn add(&mut self, entry: AuditEntry) {
        self.entries.push_back(entry);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > MAX_AUDIT_ENTRIES {
            self.entries.pop_front();
        }
    }

    /// The full retained sequence, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// Owned copy of the retained sequence, oldest first.
    pub fn to_vec(&self) -> Vec<AuditEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Discard all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
