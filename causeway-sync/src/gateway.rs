//! OfflineGateway: the write-path facade that tries the remote store first
//! and degrades to the durable queue when the device is offline or the
//! direct call fails.

use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use causeway_core::errors::{CausewayError, CausewayResult};
use causeway_core::models::{Document, MatchCriteria, Mutation, OperationKind, PendingOperation};
use causeway_core::traits::{DurableQueue, RemoteStore};

use crate::remote::dispatch_mutation;

/// How a gateway write was satisfied.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The remote store applied the mutation; `rows` echo its response.
    Applied { rows: Vec<Document> },
    /// The mutation was durably queued for a later drain.
    Queued { operation: PendingOperation },
}

impl WriteOutcome {
    pub fn is_offline(&self) -> bool {
        matches!(self, WriteOutcome::Queued { .. })
    }
}

/// Per-call tuning for gateway writes.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Queue the mutation when the direct call cannot run or fails. Disabled,
    /// the caller sees the connectivity or remote error as-is.
    pub fallback: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { fallback: true }
    }
}

/// Per-call tuning for gateway reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions {
    /// Serve the last cached snapshot when the live read is unavailable.
    /// Queued writes are never merged into the snapshot, so it can be stale.
    pub use_cache: bool,
}

/// Advisory payload handed to the offline notice hook when a write is queued.
#[derive(Debug, Clone)]
pub struct OfflineNotice {
    pub operation_id: String,
    pub collection: String,
    pub kind: OperationKind,
}

type NoticeHook = dyn Fn(&OfflineNotice) + Send + Sync;

/// Single entry point for mutating remote data.
///
/// Every call either applies the mutation on the remote store immediately or
/// durably enqueues it before returning; the offline path is an outcome, not
/// an error. Reads refresh the per-collection snapshot cache on success and
/// can fall back to it when offline.
pub struct OfflineGateway {
    remote: Arc<dyn RemoteStore>,
    store: Arc<dyn DurableQueue>,
    online: watch::Receiver<bool>,
    notice: Option<Arc<NoticeHook>>,
}

impl OfflineGateway {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        store: Arc<dyn DurableQueue>,
        online: watch::Receiver<bool>,
    ) -> Self {
        Self {
            remote,
            store,
            online,
            notice: None,
        }
    }

    /// Install the fire-and-forget hook invoked once per fallback-to-queue
    /// event, intended for toast/banner UI. A panicking hook is logged and
    /// skipped; the write it was notifying about stays queued.
    pub fn set_offline_notice(&mut self, hook: impl Fn(&OfflineNotice) + Send + Sync + 'static) {
        self.notice = Some(Arc::new(hook));
    }

    /// Current connectivity as last published by the signal.
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    pub async fn insert(&self, collection: &str, row: Document) -> CausewayResult<WriteOutcome> {
        self.apply(collection, Mutation::Insert { row }, WriteOptions::default())
            .await
    }

    pub async fn update(
        &self,
        collection: &str,
        changes: Document,
        criteria: MatchCriteria,
    ) -> CausewayResult<WriteOutcome> {
        self.apply(
            collection,
            Mutation::Update { changes, criteria },
            WriteOptions::default(),
        )
        .await
    }

    pub async fn delete(
        &self,
        collection: &str,
        criteria: MatchCriteria,
    ) -> CausewayResult<WriteOutcome> {
        self.apply(
            collection,
            Mutation::Delete { criteria },
            WriteOptions::default(),
        )
        .await
    }

    /// General write path behind [`insert`](Self::insert),
    /// [`update`](Self::update), and [`delete`](Self::delete); call it
    /// directly to disable the offline fallback for one call.
    ///
    /// Online, the mutation goes straight to the remote store; a failure
    /// falls back to the queue unless `options.fallback` is off. Offline,
    /// the mutation is queued immediately, or rejected with
    /// [`CausewayError::Offline`] when the fallback is off.
    pub async fn apply(
        &self,
        collection: &str,
        mutation: Mutation,
        options: WriteOptions,
    ) -> CausewayResult<WriteOutcome> {
        if collection.is_empty() {
            return Err(CausewayError::EmptyCollection);
        }

        // One key per logical write: a replay after a lost acknowledgment
        // deduplicates against the original direct attempt.
        let idempotency_key = Uuid::new_v4().to_string();

        if self.is_online() {
            match dispatch_mutation(self.remote.as_ref(), collection, &mutation, &idempotency_key)
                .await
            {
                Ok(rows) => return Ok(WriteOutcome::Applied { rows }),
                Err(e) if options.fallback => {
                    tracing::warn!(
                        "gateway: online {} on '{collection}' failed, queuing: {e}",
                        mutation.kind()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        } else if !options.fallback {
            return Err(CausewayError::Offline {
                collection: collection.to_string(),
            });
        }

        let operation = self.store.enqueue(collection, mutation, &idempotency_key)?;
        tracing::debug!(
            "gateway: queued {} for '{collection}' as {}",
            operation.mutation.kind(),
            operation.id
        );
        self.emit_notice(&operation);
        Ok(WriteOutcome::Queued { operation })
    }

    /// Read rows from the remote store, refreshing the collection's cached
    /// snapshot on success. With `use_cache`, an offline or failed read is
    /// served from the last snapshot instead of erroring.
    pub async fn select(
        &self,
        collection: &str,
        criteria: Option<&MatchCriteria>,
        options: SelectOptions,
    ) -> CausewayResult<Vec<Document>> {
        if collection.is_empty() {
            return Err(CausewayError::EmptyCollection);
        }

        if self.is_online() {
            match self.remote.select(collection, criteria).await {
                Ok(rows) => {
                    self.store.replace_snapshot(collection, &rows)?;
                    return Ok(rows);
                }
                Err(e) if options.use_cache => {
                    tracing::warn!(
                        "gateway: select on '{collection}' failed, serving cached rows: {e}"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        } else if !options.use_cache {
            return Err(CausewayError::Offline {
                collection: collection.to_string(),
            });
        }

        self.store.read_snapshot(collection)
    }

    // The hook runs after the enqueue committed; a panic inside it must not
    // take the already-durable write's outcome down with it.
    fn emit_notice(&self, operation: &PendingOperation) {
        if let Some(hook) = &self.notice {
            let notice = OfflineNotice {
                operation_id: operation.id.clone(),
                collection: operation.collection.clone(),
                kind: operation.mutation.kind(),
            };
            let called = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| hook(&notice)));
            if called.is_err() {
                tracing::warn!("gateway: offline notice hook panicked, write stays queued");
            }
        }
    }
}
