//! SyncEngine: drains the durable queue against the remote store, one record
//! at a time, with per-record failure isolation and status broadcasts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use causeway_core::config::SyncConfig;
use causeway_core::errors::{CausewayResult, RemoteError};
use causeway_core::models::{OperationStatus, PendingOperation};
use causeway_core::traits::{DurableQueue, RemoteStore};

use crate::remote::dispatch_mutation;
use crate::status::{StatusFeed, SubscriptionId, SyncStatus};

/// Terminal state of one drain call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainStatus {
    /// The queue was walked to the end; per-record failures are counted, not
    /// escalated.
    #[default]
    Completed,
    /// Another drain held the guard; nothing was done.
    AlreadyRunning,
    /// The drain itself aborted before finishing the batch.
    Failed,
}

/// Result of one drain call.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub status: DrainStatus,
    pub synced: usize,
    pub failed: usize,
    pub message: Option<String>,
}

/// Replays queued mutations against the remote store.
///
/// At most one drain runs at a time per engine; a second call while one is in
/// flight returns [`DrainStatus::AlreadyRunning`] without touching the queue.
/// Records are replayed sequentially in enqueue order so the remote observes
/// writes in the order the user made them.
pub struct SyncEngine {
    store: Arc<dyn DurableQueue>,
    remote: Arc<dyn RemoteStore>,
    feed: StatusFeed,
    draining: AtomicBool,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn DurableQueue>,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            feed: StatusFeed::new(),
            draining: AtomicBool::new(false),
            config,
        }
    }

    /// Drain the queue once.
    ///
    /// 1. Reject the call if a drain is already in flight.
    /// 2. Requeue Syncing leftovers from an interrupted process.
    /// 3. Fetch the batch (Failed records included when `retry_failed` is on).
    /// 4. Replay each record in order: success deletes it, failure marks it
    ///    Failed with the error message and moves on.
    /// 5. Broadcast the queue position after every record, then a terminal
    ///    Idle or Error status.
    pub async fn sync_pending(&self) -> DrainReport {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sync: drain already in progress, skipping");
            return DrainReport {
                status: DrainStatus::AlreadyRunning,
                ..Default::default()
            };
        }

        let outcome = self.drain_batch().await;
        self.draining.store(false, Ordering::Release);

        match outcome {
            Ok((synced, failed)) => {
                if synced > 0 || failed > 0 {
                    tracing::info!("sync: drain complete, synced {synced}, failed {failed}");
                }
                self.feed.emit(SyncStatus::idle(self.queued_total()));
                DrainReport {
                    status: DrainStatus::Completed,
                    synced,
                    failed,
                    message: Some(format!("synced {synced}, failed {failed}")),
                }
            }
            Err(e) => {
                tracing::error!("sync: drain aborted: {e}");
                self.feed.emit(SyncStatus::error(self.queued_total()));
                DrainReport {
                    status: DrainStatus::Failed,
                    synced: 0,
                    failed: 0,
                    message: Some(e.to_string()),
                }
            }
        }
    }

    async fn drain_batch(&self) -> CausewayResult<(usize, usize)> {
        self.store.requeue_stale_syncing()?;

        let batch = self.store.list_pending(self.config.retry_failed)?;
        if batch.is_empty() {
            return Ok((0, 0));
        }

        tracing::info!("sync: draining {} queued operations", batch.len());
        self.feed.emit(SyncStatus::syncing(batch.len()));

        let total = batch.len();
        let mut synced = 0usize;
        let mut failed = 0usize;

        for (done, op) in batch.iter().enumerate() {
            self.store
                .mark_status(&op.id, OperationStatus::Syncing, None)?;

            match self.replay(op).await {
                Ok(()) => {
                    self.store.remove(&op.id)?;
                    synced += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        "sync: {} replay failed for '{}': {e}",
                        op.mutation.kind(),
                        op.collection
                    );
                    self.store
                        .mark_status(&op.id, OperationStatus::Failed, Some(&e.to_string()))?;
                    failed += 1;
                }
            }

            self.feed.emit(SyncStatus::syncing(total - done - 1));
        }

        Ok((synced, failed))
    }

    async fn replay(&self, op: &PendingOperation) -> Result<(), RemoteError> {
        let call = dispatch_mutation(
            self.remote.as_ref(),
            &op.collection,
            &op.mutation,
            &op.idempotency_key,
        );
        let result = match self.config.replay_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::TimedOut {
                    seconds: limit.as_secs(),
                }),
            },
            None => call.await,
        };
        result.map(|_| ())
    }

    /// Register a status listener; it sees every broadcast from now on.
    pub fn on_status_change(
        &self,
        listener: impl Fn(SyncStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.feed.subscribe(listener)
    }

    /// Deregister a status listener.
    pub fn off_status_change(&self, id: SubscriptionId) {
        self.feed.unsubscribe(id)
    }

    /// Pending records in the queue, for UI hydration before any broadcast.
    pub fn pending_count(&self) -> CausewayResult<usize> {
        self.store.pending_count()
    }

    // Queue depth for terminal broadcasts: Failed leftovers still await a
    // future drain, so they count. A failing read degrades to zero.
    fn queued_total(&self) -> usize {
        let pending = self.store.pending_count().unwrap_or(0);
        let failed = self.store.failed_count().unwrap_or(0);
        pending + failed
    }
}
