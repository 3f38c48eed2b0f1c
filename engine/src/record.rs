//! Record type shared by every entity collection.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A data record in one of the entity collections.
///
/// All collections share this structural contract:
/// - `id` is globally unique and immutable once created
/// - `created_at` is set at creation and never changes
/// - `updated_at` is set on every mutation; `None` means the record was
///   never updated since creation
/// - everything else is collection-specific and opaque to reconciliation
///
/// Timestamps serialize as RFC 3339 strings, so their chronological order
/// matches their lexicographic order on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier, immutable once created
    pub id: RecordId,
    /// When the record was first created
    pub created_at: Timestamp,
    /// When the record was last mutated, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Collection-specific payload, flattened onto the record
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Create a new record that has never been updated.
    pub fn new(
        id: impl Into<RecordId>,
        created_at: Timestamp,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            updated_at: None,
            fields,
        }
    }

    /// Mark the record as mutated at the given time.
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = Some(at);
    }

    /// Look up a payload field by name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}
