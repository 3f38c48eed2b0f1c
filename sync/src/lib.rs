//! # Pestle Sync
//!
//! Async orchestration around the [`pestle_engine`] reconciliation core.
//!
//! This crate owns the two sync entry points of the pharmacy POS:
//!
//! - **Queue replay** ([`SyncEngine::process_queue`]): attempts every
//!   pending mutation against the remote store, removing actions only on
//!   confirmed success. At-least-once delivery; one failing action never
//!   blocks the rest.
//! - **Full sync** ([`SyncEngine::full_sync`]): fetches the remote snapshot
//!   of all four collections concurrently, merges each with the local
//!   snapshot (last-write-wins), persists the merged result, then replays
//!   the queue against the now-current remote state.
//!
//! The remote store itself is an opaque boundary behind the
//! [`RemoteGateway`] trait. When no remote endpoint is configured, both
//! entry points are silent no-ops so the application stays fully usable
//! offline. Connectivity is signaled through an explicitly injected
//! [`ConnectivityState`] handle written only by the engine.

pub mod connectivity;
pub mod engine;
pub mod error;
pub mod gateway;

pub use connectivity::ConnectivityState;
pub use engine::{Actor, ReplayOutcome, SyncEngine, SyncReport};
pub use error::SyncError;
pub use gateway::{GatewayError, GatewayResult, RemoteGateway};
