//! Local record store - the sole writer of persisted collection state.
//!
//! Collections are id-keyed. The reconciliation engine writes merged
//! results back through [`LocalStore::save`] as full-snapshot replacements,
//! never incremental patches.

use crate::{EntityKind, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Typed collections for the four entity kinds, keyed by record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalStore {
    collections: BTreeMap<EntityKind, HashMap<RecordId, Record>>,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    /// Create a store with all four collections empty.
    pub fn new() -> Self {
        let mut collections = BTreeMap::new();
        for kind in EntityKind::ALL {
            collections.insert(kind, HashMap::new());
        }
        Self { collections }
    }

    /// The full snapshot of one collection.
    ///
    /// Ordering is unspecified; collections are id-keyed, not
    /// sequence-ordered.
    pub fn get_all(&self, kind: EntityKind) -> Vec<Record> {
        self.collections
            .get(&kind)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Replace the full snapshot of one collection.
    pub fn save(&mut self, kind: EntityKind, records: Vec<Record>) {
        let collection = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        self.collections.insert(kind, collection);
    }

    /// Look up a single record.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Record> {
        self.collections.get(&kind)?.get(id)
    }

    /// Insert or replace a single record.
    pub fn upsert(&mut self, kind: EntityKind, record: Record) {
        self.collections
            .entry(kind)
            .or_default()
            .insert(record.id.clone(), record);
    }

    /// Remove a single record, returning it if it existed.
    pub fn remove(&mut self, kind: EntityKind, id: &str) -> Option<Record> {
        self.collections.get_mut(&kind)?.remove(id)
    }

    /// Number of records in one collection.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.collections.get(&kind).map_or(0, |c| c.len())
    }

    /// Whether every collection is empty.
    pub fn is_empty(&self) -> bool {
        self.collections.values().all(|c| c.is_empty())
    }

    /// Total record count across all collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(|c| c.len()).sum()
    }

    pub(crate) fn collections(&self) -> &BTreeMap<EntityKind, HashMap<RecordId, Record>> {
        &self.collections
    }
}
