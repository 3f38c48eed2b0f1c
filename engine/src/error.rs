//! Error types for the Pestle engine.

use thiserror::Error;

/// All possible errors from the Pestle engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The mutation queue refused a new action. The action is dropped;
    /// the caller must surface this to the user.
    #[error("mutation queue is full (capacity {capacity})")]
    StorageFull { capacity: usize },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
