//! # Pestle Engine
//!
//! The offline reconciliation core of the Pestle pharmacy point-of-sale.
//!
//! A pharmacy terminal must keep selling when the network is gone and later
//! reconcile its local state with the remote store. This crate holds the
//! logic that makes that safe: typed entity collections, a durable mutation
//! queue, a bounded audit log, and a deterministic last-write-wins merge.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or platform
//! - **Deterministic**: the same inputs always produce the same outputs
//! - **Testable**: pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! Every collection (medicines, sales, refunds, expenses) shares one
//! structural contract: an immutable `id`, an immutable `createdAt`, an
//! optional `updatedAt` set on every mutation, and collection-specific
//! fields that are opaque to reconciliation. See [`Record`].
//!
//! ### Mutation Queue
//!
//! Mutations made while the remote store cannot confirm durability are
//! logged as [`QueuedAction`]s in a [`MutationQueue`]. Entries survive
//! restarts (via [`StateSnapshot`]) and are removed only once the remote
//! store acknowledges the corresponding operation.
//!
//! ### Merge
//!
//! [`merge_records`] combines a local and a remote snapshot of one
//! collection into a single dataset: remote records are the default winner,
//! local records survive when unseen remotely or strictly newer by
//! `updatedAt`. One entry per unique id, always.
//!
//! ### Audit Log
//!
//! [`AuditLog`] is an append-only trail of user actions, capped at the most
//! recent 1000 entries. It is observational only and never participates in
//! reconciliation.
//!
//! ## Persistence
//!
//! Use [`StateSnapshot`] to capture and restore the full local state
//! (collections, queue, audit log). Snapshots serialize to JSON with
//! deterministic ordering.

pub mod action;
pub mod audit;
pub mod entity;
pub mod error;
pub mod merge;
pub mod queue;
pub mod record;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use action::{ActionKind, QueuedAction};
pub use audit::{AuditEntry, AuditLog, MAX_AUDIT_ENTRIES};
pub use entity::EntityKind;
pub use error::Error;
pub use merge::merge_records;
pub use queue::{MutationQueue, DEFAULT_QUEUE_CAPACITY};
pub use record::Record;
pub use snapshot::{StateSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use store::LocalStore;

/// Type aliases for clarity
pub type RecordId = String;
pub type ActionId = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
