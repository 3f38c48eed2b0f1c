//! The remote gateway boundary.
//!
//! The concrete remote store (its transport, credentials, retries) lives
//! outside this crate; reconciliation only needs the operations below.
//! Implementations are expected to impose their own timeouts and report
//! timeout as an ordinary failure.

use async_trait::async_trait;
use pestle_engine::Record;
use thiserror::Error;

/// A failed remote operation.
///
/// The engine does not distinguish failure causes; a failed fetch aborts a
/// full sync and a failed mutation leaves its action queued for the next
/// pass, whatever the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote operation failed: {0}")]
pub struct GatewayError(pub String);

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Abstraction over the remote data store.
///
/// Operations must be idempotent from the caller's perspective: replay is
/// at-least-once, so repeating an already-applied operation (an upsert with
/// the same id, a delete of an absent id) must not corrupt remote state.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Whether a remote endpoint is configured at all.
    ///
    /// When false, every sync entry point short-circuits into a no-op
    /// instead of failing - the application keeps working offline.
    fn is_configured(&self) -> bool;

    /// Fetch the full snapshot of one collection.
    async fn fetch_all(&self, collection: &str) -> GatewayResult<Vec<Record>>;

    /// Insert-or-replace records by id.
    async fn upsert(&self, collection: &str, records: &[Record]) -> GatewayResult<()>;

    /// Insert a single record.
    async fn insert(&self, collection: &str, record: &Record) -> GatewayResult<()>;

    /// Update a single record matched by id.
    async fn update(&self, collection: &str, id: &str, record: &Record) -> GatewayResult<()>;

    /// Delete a single record matched by id.
    async fn delete(&self, collection: &str, id: &str) -> GatewayResult<()>;
}
