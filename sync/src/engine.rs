//! The reconciliation engine: queue replay and full synchronization.
//!
//! Exactly one reconciliation pass may be in flight at a time; `full_sync`
//! and `process_queue` invocations are serialized by an internal
//! single-flight guard so concurrent passes cannot race on local-store
//! writes and lose an update.
//! Queue replay within a pass is sequential to keep per-record ordering and
//! failure isolation straightforward. The only suspension points are the
//! remote gateway calls.

use crate::{error::Result, ConnectivityState, GatewayResult, RemoteGateway};
use pestle_engine::{
    merge_records, ActionId, ActionKind, AuditEntry, AuditLog, EntityKind, LocalStore,
    MutationQueue, QueuedAction, Record, StateSnapshot,
};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Who performed a mutation, for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub username: String,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// Outcome of replaying one queued action.
///
/// Replay collects an explicit per-action outcome list instead of
/// swallowing failures, so callers can assert on partial success without
/// scraping logs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub action_id: ActionId,
    pub entity: EntityKind,
    pub action: ActionKind,
    pub result: GatewayResult<()>,
}

impl ReplayOutcome {
    /// Whether the remote store acknowledged this action.
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// What a full sync did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Merged record count per collection
    pub merged: BTreeMap<EntityKind, usize>,
    /// Per-action outcomes of the replay pass that followed the merge
    pub replay: Vec<ReplayOutcome>,
}

/// Local state guarded as one unit: the reconciliation engine is the sole
/// writer of merged results, and the queue is mutated only here (removal)
/// and by the mutation-issuing caller through [`SyncEngine::submit`].
struct SharedState {
    store: LocalStore,
    queue: MutationQueue,
    audit: AuditLog,
}

/// Orchestrates mutations, queue replay, and full bidirectional sync.
pub struct SyncEngine<G> {
    gateway: G,
    state: Mutex<SharedState>,
    connectivity: ConnectivityState,
    /// Single-flight guard serializing reconciliation passes (full syncs
    /// and caller-invoked queue replays)
    sync_guard: Mutex<()>,
}

impl<G: RemoteGateway> SyncEngine<G> {
    /// Create an engine with empty local state.
    ///
    /// The connectivity handle is injected so the application owns it and
    /// can hand clones to anything that needs the signal; the engine is
    /// its sole writer.
    pub fn new(gateway: G, connectivity: ConnectivityState) -> Self {
        Self::with_state(
            gateway,
            connectivity,
            LocalStore::new(),
            MutationQueue::new(),
            AuditLog::new(),
        )
    }

    /// Create an engine from previously persisted state.
    pub fn from_snapshot(gateway: G, connectivity: ConnectivityState, snapshot: StateSnapshot) -> Self {
        let (store, queue, audit) = snapshot.restore();
        Self::with_state(gateway, connectivity, store, queue, audit)
    }

    fn with_state(
        gateway: G,
        connectivity: ConnectivityState,
        store: LocalStore,
        queue: MutationQueue,
        audit: AuditLog,
    ) -> Self {
        Self {
            gateway,
            state: Mutex::new(SharedState { store, queue, audit }),
            connectivity,
            sync_guard: Mutex::new(()),
        }
    }

    /// Handle to the shared connectivity flag.
    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity.clone()
    }

    /// The remote gateway this engine drives.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Apply a user mutation: update the local store, log the action to the
    /// mutation queue, record an audit entry, and - when a remote endpoint
    /// is configured - attempt immediate remote dispatch.
    ///
    /// The action is always queued first as a durability fallback; a
    /// successful direct dispatch removes it again. A full queue surfaces
    /// [`pestle_engine::Error::StorageFull`] and drops the mutation.
    pub async fn submit(
        &self,
        entity: EntityKind,
        action: ActionKind,
        mut record: Record,
        actor: &Actor,
    ) -> Result<ActionId> {
        let now = chrono::Utc::now();
        if action == ActionKind::Update {
            record.touch(now);
        }

        let queued = QueuedAction::new(
            uuid::Uuid::new_v4().to_string(),
            entity,
            action,
            record.clone(),
            now,
        );
        let action_id = queued.id.clone();

        {
            let mut state = self.state.lock().await;
            state.queue.enqueue(queued.clone())?;

            match action {
                ActionKind::Create | ActionKind::Update => {
                    state.store.upsert(entity, record.clone())
                }
                ActionKind::Delete => {
                    state.store.remove(entity, &record.id);
                }
            }

            state.audit.add(AuditEntry {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: actor.user_id.clone(),
                username: actor.username.clone(),
                action: action.as_str().to_string(),
                entity_type: entity,
                entity_id: record.id.clone(),
                details: None,
                timestamp: now,
            });
        }

        if self.gateway.is_configured() {
            match self.send(&queued, false).await {
                Ok(()) => {
                    self.state.lock().await.queue.remove(&action_id);
                    tracing::debug!(action_id = %action_id, "mutation confirmed remotely");
                }
                Err(err) => {
                    // Stays queued for the next replay pass
                    tracing::warn!(action_id = %action_id, error = %err, "direct dispatch failed");
                }
            }
        }

        Ok(action_id)
    }

    /// Record an audit entry that is not tied to a mutation (e.g. a login).
    pub async fn add_audit(&self, entry: AuditEntry) {
        self.state.lock().await.audit.add(entry);
    }

    /// Replay every pending action against the remote store, in insertion
    /// order. Actions are removed if and only if the remote operation
    /// succeeds; failures are logged and left queued for a later pass.
    ///
    /// Serialized with [`full_sync`](Self::full_sync) by the single-flight
    /// guard: at most one reconciliation pass is in flight at a time.
    ///
    /// No-op (empty outcome list, zero remote calls) when the gateway is
    /// not configured.
    pub async fn process_queue(&self) -> Vec<ReplayOutcome> {
        let _flight = self.sync_guard.lock().await;
        self.replay_queue().await
    }

    // Caller must hold the sync guard.
    async fn replay_queue(&self) -> Vec<ReplayOutcome> {
        if !self.gateway.is_configured() {
            return Vec::new();
        }

        let pending = self.state.lock().await.queue.pending().to_vec();
        let mut outcomes = Vec::with_capacity(pending.len());

        for action in pending {
            let result = self.send(&action, true).await;
            match &result {
                Ok(()) => {
                    self.state.lock().await.queue.remove(&action.id);
                    tracing::debug!(action_id = %action.id, "queued action confirmed, removed");
                }
                Err(err) => {
                    tracing::warn!(
                        action_id = %action.id,
                        entity = %action.entity,
                        error = %err,
                        "queued action failed, retrying next pass"
                    );
                }
            }
            outcomes.push(ReplayOutcome {
                action_id: action.id,
                entity: action.entity,
                action: action.action,
                result,
            });
        }

        outcomes
    }

    /// Full bidirectional synchronization.
    ///
    /// Fetches all four collections concurrently (all-or-nothing: any fetch
    /// error aborts the whole call), merges each with the local snapshot
    /// last-write-wins, persists the merged results, then replays the
    /// mutation queue against the now-current remote state.
    ///
    /// On success the connectivity flag is set online; on any mid-flight
    /// error it is set offline and the error propagates. When the gateway
    /// is not configured this is a silent no-op: zero remote calls, local
    /// state and connectivity untouched.
    pub async fn full_sync(&self) -> Result<SyncReport> {
        let _flight = self.sync_guard.lock().await;

        if !self.gateway.is_configured() {
            tracing::debug!("remote gateway not configured, skipping full sync");
            return Ok(SyncReport::default());
        }

        match self.sync_once().await {
            Ok(report) => {
                self.connectivity.set_offline(false);
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(error = %err, "full sync failed, flagging offline");
                self.connectivity.set_offline(true);
                Err(err)
            }
        }
    }

    async fn sync_once(&self) -> Result<SyncReport> {
        // Independent reads, fan-out/fan-in with all-or-nothing join
        let (medicines, sales, refunds, expenses) = tokio::try_join!(
            self.gateway.fetch_all(EntityKind::Medicine.collection_name()),
            self.gateway.fetch_all(EntityKind::Sale.collection_name()),
            self.gateway.fetch_all(EntityKind::Refund.collection_name()),
            self.gateway.fetch_all(EntityKind::Expense.collection_name()),
        )?;

        let fetched = [
            (EntityKind::Medicine, medicines),
            (EntityKind::Sale, sales),
            (EntityKind::Refund, refunds),
            (EntityKind::Expense, expenses),
        ];

        let mut merged_counts = BTreeMap::new();
        {
            let mut state = self.state.lock().await;
            for (kind, remote) in fetched {
                let merged = merge_records(state.store.get_all(kind), remote);
                merged_counts.insert(kind, merged.len());
                state.store.save(kind, merged);
            }
        }

        let total: usize = merged_counts.values().sum();
        tracing::info!(records = total, "merged remote snapshot into local store");

        let replay = self.replay_queue().await;

        Ok(SyncReport {
            merged: merged_counts,
            replay,
        })
    }

    /// Send one action to the remote store.
    ///
    /// Replayed creates go through bulk upsert: delivery is at-least-once
    /// (a crash between remote success and queue removal resends the
    /// action), so a repeated create must not produce a duplicate.
    async fn send(&self, action: &QueuedAction, replay: bool) -> GatewayResult<()> {
        let collection = action.entity.collection_name();
        match action.action {
            ActionKind::Create if replay => {
                self.gateway
                    .upsert(collection, std::slice::from_ref(&action.data))
                    .await
            }
            ActionKind::Create => self.gateway.insert(collection, &action.data).await,
            ActionKind::Update => {
                self.gateway
                    .update(collection, &action.data.id, &action.data)
                    .await
            }
            ActionKind::Delete => self.gateway.delete(collection, &action.data.id).await,
        }
    }

    /// Snapshot of one collection from the local store.
    pub async fn records(&self, kind: EntityKind) -> Vec<Record> {
        self.state.lock().await.store.get_all(kind)
    }

    /// Look up a single local record.
    pub async fn record(&self, kind: EntityKind, id: &str) -> Option<Record> {
        self.state.lock().await.store.get(kind, id).cloned()
    }

    /// The ordered pending actions.
    pub async fn pending_actions(&self) -> Vec<QueuedAction> {
        self.state.lock().await.queue.pending().to_vec()
    }

    /// The retained audit entries, oldest first.
    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.to_vec()
    }

    /// Capture the full local state for persistence.
    pub async fn export_snapshot(&self) -> StateSnapshot {
        let state = self.state.lock().await;
        StateSnapshot::capture(&state.store, &state.queue, &state.audit)
    }
}
