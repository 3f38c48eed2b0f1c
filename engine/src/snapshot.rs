//! Snapshot types for persisting and restoring local state.
//!
//! Snapshots are the bridge between the in-memory state and persistent
//! storage, and the reason queued actions survive restarts. They serialize
//! to JSON with deterministic ordering.

use crate::{
    error::Result, AuditEntry, AuditLog, EntityKind, Error, LocalStore, MutationQueue,
    QueuedAction, Record, RecordId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time capture of the full local state: every collection, the
/// mutation queue, and the audit log.
///
/// Uses BTreeMap for deterministic serialization order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// All records organized by collection, then by record id
    pub collections: BTreeMap<EntityKind, BTreeMap<RecordId, Record>>,
    /// Pending actions not yet confirmed by the remote store
    pub queue: Vec<QueuedAction>,
    /// Capacity of the mutation queue
    pub queue_capacity: usize,
    /// Retained audit entries, oldest first.
    ///
    /// Deserialized leniently: the audit log is observational, so corrupt
    /// entries are dropped instead of failing the whole snapshot load and
    /// taking the store and queue down with them.
    #[serde(default, deserialize_with = "lenient_audit")]
    pub audit: Vec<AuditEntry>,
}

fn lenient_audit<'de, D>(deserializer: D) -> std::result::Result<Vec<AuditEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let entries = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(entries)
}

impl StateSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            collections: BTreeMap::new(),
            queue: Vec::new(),
            queue_capacity: crate::DEFAULT_QUEUE_CAPACITY,
            audit: Vec::new(),
        }
    }

    /// Capture the current state of store, queue, and audit log.
    pub fn capture(store: &LocalStore, queue: &MutationQueue, audit: &AuditLog) -> Self {
        let collections = store
            .collections()
            .iter()
            .map(|(kind, records)| {
                let ordered: BTreeMap<_, _> = records
                    .iter()
                    .map(|(id, r)| (id.clone(), r.clone()))
                    .collect();
                (*kind, ordered)
            })
            .collect();

        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            collections,
            queue: queue.pending().to_vec(),
            queue_capacity: queue.capacity(),
            audit: audit.to_vec(),
        }
    }

    /// Rebuild store, queue, and audit log from this snapshot.
    pub fn restore(self) -> (LocalStore, MutationQueue, AuditLog) {
        let mut store = LocalStore::new();
        for (kind, records) in self.collections {
            store.save(kind, records.into_values().collect());
        }

        let queue = MutationQueue::from_actions(self.queue, self.queue_capacity);
        let audit = AuditLog::from_entries(self.audit);

        (store, queue, audit)
    }

    /// Total record count across all collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(|c| c.len()).sum()
    }

    /// Number of pending actions in the snapshot.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionKind, Timestamp};
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn record(id: &str, name: &str) -> Record {
        Record::new(
            id,
            ts("2024-01-01T00:00:00Z"),
            match json!({"name": name}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            },
        )
    }

    fn sample_state() -> (LocalStore, MutationQueue, AuditLog) {
        let mut store = LocalStore::new();
        store.upsert(EntityKind::Medicine, record("m1", "Aspirin"));
        store.upsert(EntityKind::Sale, record("s1", "sale"));

        let mut queue = MutationQueue::with_capacity(100);
        queue
            .enqueue(QueuedAction::new(
                "a1",
                EntityKind::Sale,
                ActionKind::Create,
                record("s1", "sale"),
                ts("2024-01-01T08:00:00Z"),
            ))
            .unwrap();

        let mut audit = AuditLog::new();
        audit.add(AuditEntry {
            id: "audit-1".into(),
            user_id: "u1".into(),
            username: "amira".into(),
            action: "create".into(),
            entity_type: EntityKind::Sale,
            entity_id: "s1".into(),
            details: None,
            timestamp: ts("2024-01-01T08:00:00Z"),
        });

        (store, queue, audit)
    }

    #[test]
    fn capture_and_restore_roundtrip() {
        let (store, queue, audit) = sample_state();
        let snapshot = StateSnapshot::capture(&store, &queue, &audit);

        assert_eq!(snapshot.record_count(), 2);
        assert_eq!(snapshot.pending_count(), 1);

        let (store2, queue2, audit2) = snapshot.restore();
        assert_eq!(store2.get(EntityKind::Medicine, "m1"), store.get(EntityKind::Medicine, "m1"));
        assert_eq!(queue2.pending(), queue.pending());
        assert_eq!(queue2.capacity(), 100);
        assert_eq!(audit2.to_vec(), audit.to_vec());
    }

    #[test]
    fn json_roundtrip() {
        let (store, queue, audit) = sample_state();
        let snapshot = StateSnapshot::capture(&store, &queue, &audit);

        let json = snapshot.to_json().unwrap();
        let restored = StateSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
    }

    #[test]
    fn deterministic_serialization() {
        let mut store1 = LocalStore::new();
        store1.upsert(EntityKind::Medicine, record("m-a", "Aspirin"));
        store1.upsert(EntityKind::Medicine, record("m-b", "Ibuprofen"));

        // Insert in reverse order
        let mut store2 = LocalStore::new();
        store2.upsert(EntityKind::Medicine, record("m-b", "Ibuprofen"));
        store2.upsert(EntityKind::Medicine, record("m-a", "Aspirin"));

        let queue = MutationQueue::new();
        let audit = AuditLog::new();

        let json1 = StateSnapshot::capture(&store1, &queue, &audit).to_json().unwrap();
        let json2 = StateSnapshot::capture(&store2, &queue, &audit).to_json().unwrap();
        assert_eq!(json1, json2);
    }

    #[test]
    fn reject_future_format_version() {
        let json = r#"{
            "formatVersion": 999,
            "collections": {},
            "queue": [],
            "queueCapacity": 10000,
            "audit": []
        }"#;

        let result = StateSnapshot::from_json(json);
        assert!(matches!(result, Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn malformed_json_is_invalid_snapshot() {
        let result = StateSnapshot::from_json("{not json");
        assert!(matches!(result, Err(Error::InvalidSnapshot(_))));
    }

    #[test]
    fn corrupt_audit_entries_do_not_block_restore() {
        // One malformed audit entry must not make the store and queue
        // unrecoverable; the bad entry is dropped, the valid one kept.
        let json = r#"{
            "formatVersion": 1,
            "collections": {
                "medicine": {
                    "m1": {"id": "m1", "createdAt": "2024-01-01T00:00:00Z", "name": "Aspirin"}
                }
            },
            "queue": [],
            "queueCapacity": 10000,
            "audit": [
                {"id": "audit-1"},
                {
                    "id": "audit-2",
                    "userId": "u1",
                    "username": "amira",
                    "action": "create",
                    "entityType": "medicine",
                    "entityId": "m1",
                    "timestamp": "2024-01-01T00:00:00Z"
                }
            ]
        }"#;

        let snapshot = StateSnapshot::from_json(json).unwrap();
        let (store, _, audit) = snapshot.restore();
        assert!(store.get(EntityKind::Medicine, "m1").is_some());
        assert_eq!(audit.len(), 1);
        assert_eq!(audit.entries().next().unwrap().id, "audit-2");
    }

    #[test]
    fn non_array_audit_restores_as_empty_log() {
        let json = r#"{
            "formatVersion": 1,
            "collections": {},
            "queue": [],
            "queueCapacity": 10000,
            "audit": "garbage"
        }"#;

        let snapshot = StateSnapshot::from_json(json).unwrap();
        let (_, _, audit) = snapshot.restore();
        assert!(audit.is_empty());
    }

    #[test]
    fn restore_caps_oversized_audit() {
        let mut snapshot = StateSnapshot::new();
        for n in 0..(crate::MAX_AUDIT_ENTRIES + 10) {
            snapshot.audit.push(AuditEntry {
                id: format!("audit-{}", n),
                user_id: "u1".into(),
                username: "amira".into(),
                action: "create".into(),
                entity_type: EntityKind::Sale,
                entity_id: format!("s{}", n),
                details: None,
                timestamp: ts("2024-01-01T00:00:00Z"),
            });
        }

        let (_, _, audit) = snapshot.restore();
        assert_eq!(audit.len(), crate::MAX_AUDIT_ENTRIES);
    }
}
