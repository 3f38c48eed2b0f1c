//! Entity collections handled by the reconciliation core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four entity collections of the pharmacy POS.
///
/// Each kind maps to exactly one collection in the remote store. The
/// reconciliation logic treats the contents of a collection as opaque;
/// only the shared structural contract (`id`, `createdAt`, `updatedAt`)
/// matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Medicine,
    Sale,
    Refund,
    Expense,
}

impl EntityKind {
    /// All kinds, in the order collections are fetched during a full sync.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Medicine,
        EntityKind::Sale,
        EntityKind::Refund,
        EntityKind::Expense,
    ];

    /// Name of the corresponding collection in the remote store.
    pub fn collection_name(self) -> &'static str {
        match self {
            EntityKind::Medicine => "medicines",
            EntityKind::Sale => "sales",
            EntityKind::Refund => "refunds",
            EntityKind::Expense => "expenses",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Medicine => "medicine",
            EntityKind::Sale => "sale",
            EntityKind::Refund => "refund",
            EntityKind::Expense => "expense",
        };
        f.write_str(name)
    }
}
