//! Process-wide connectivity signal.
//!
//! The rest of the application (UI, schedulers) reads this flag to disable
//! remote-dependent features. It is an explicitly injected shared handle
//! rather than an ambient global, with a single write-owner: the
//! [`SyncEngine`](crate::SyncEngine) flips it at the end of each sync
//! attempt, and nothing else does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the shared offline flag.
///
/// Starts online (optimistic) until a sync attempt says otherwise.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityState {
    offline: Arc<AtomicBool>,
}

impl ConnectivityState {
    /// Create a new handle in the online state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last sync attempt concluded the remote is unreachable.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Write the flag. Crate-private: the sync engine is the sole writer.
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}
