//! Error handling for sync orchestration.

use crate::GatewayError;
use thiserror::Error;

/// Errors surfaced by the sync engine.
///
/// An unconfigured gateway is deliberately not represented here: sync entry
/// points silently no-op in that case. Failures that only affect
/// observability (the audit log) never reach this type either; what does
/// reach it is anything touching data durability - the mutation queue, the
/// record store, or a full-sync fetch.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync failed: {0}")]
    Remote(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] pestle_engine::Error),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
