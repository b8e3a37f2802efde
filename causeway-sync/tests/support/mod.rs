//! Shared test doubles: call-recording and fault-injecting remotes, plus a
//! queue whose every call fails.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use causeway_core::errors::{CausewayResult, RemoteError, StoreError};
use causeway_core::models::{Document, MatchCriteria, Mutation, OperationStatus, PendingOperation};
use causeway_core::traits::{DurableQueue, RemoteStore};
use causeway_sync::MemoryRemote;

pub fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

fn marker(fields: &Document) -> String {
    fields
        .get("id")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Remote that records every call as "kind:collection:id" and can be told to
/// reject specific row ids. Stateless otherwise.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<String>>,
    rejected_ids: Mutex<HashSet<String>>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_id(&self, id: &str) {
        self.rejected_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn allow_id(&self, id: &str) {
        self.rejected_ids.lock().unwrap().remove(id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{kind}:{collection}:{id}"));
        if self.rejected_ids.lock().unwrap().contains(id) {
            return Err(RemoteError::Rejected {
                reason: format!("row {id} is rejected"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RecordingRemote {
    async fn insert(
        &self,
        collection: &str,
        row: &Document,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        self.record("insert", collection, &marker(row))?;
        Ok(vec![row.clone()])
    }

    async fn update(
        &self,
        collection: &str,
        changes: &Document,
        criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        self.record("update", collection, &marker(criteria))?;
        Ok(vec![changes.clone()])
    }

    async fn delete(
        &self,
        collection: &str,
        criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<(), RemoteError> {
        self.record("delete", collection, &marker(criteria))
    }

    async fn select(
        &self,
        collection: &str,
        _criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError> {
        self.record("select", collection, "*")?;
        Ok(Vec::new())
    }
}

/// Remote whose writes park until released, for exercising the in-flight
/// drain guard.
pub struct BlockingRemote {
    entered: Notify,
    gate: Semaphore,
}

impl BlockingRemote {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            gate: Semaphore::new(0),
        }
    }

    /// Resolves once a write has parked on the gate.
    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    /// Let `n` parked or future writes through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    async fn park(&self) {
        self.entered.notify_one();
        // One permit per write; forget keeps the gate shut behind us.
        self.gate.acquire().await.unwrap().forget();
    }
}

impl Default for BlockingRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for BlockingRemote {
    async fn insert(
        &self,
        _collection: &str,
        row: &Document,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        self.park().await;
        Ok(vec![row.clone()])
    }

    async fn update(
        &self,
        _collection: &str,
        changes: &Document,
        _criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        self.park().await;
        Ok(vec![changes.clone()])
    }

    async fn delete(
        &self,
        _collection: &str,
        _criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<(), RemoteError> {
        self.park().await;
        Ok(())
    }

    async fn select(
        &self,
        _collection: &str,
        _criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError> {
        Ok(Vec::new())
    }
}

/// Remote where every call fails with a network error.
pub struct DownRemote;

fn unreachable_err() -> RemoteError {
    RemoteError::Network {
        reason: "host unreachable".to_string(),
    }
}

#[async_trait]
impl RemoteStore for DownRemote {
    async fn insert(
        &self,
        _collection: &str,
        _row: &Document,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        Err(unreachable_err())
    }

    async fn update(
        &self,
        _collection: &str,
        _changes: &Document,
        _criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        Err(unreachable_err())
    }

    async fn delete(
        &self,
        _collection: &str,
        _criteria: &MatchCriteria,
        _idempotency_key: &str,
    ) -> Result<(), RemoteError> {
        Err(unreachable_err())
    }

    async fn select(
        &self,
        _collection: &str,
        _criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError> {
        Err(unreachable_err())
    }
}

/// Wraps a [`MemoryRemote`] and drops the acknowledgment of the next insert:
/// the row is applied server-side but the caller sees a network error.
pub struct AckLostRemote {
    inner: MemoryRemote,
    drop_acks: AtomicUsize,
}

impl AckLostRemote {
    pub fn new() -> Self {
        Self {
            inner: MemoryRemote::new(),
            drop_acks: AtomicUsize::new(0),
        }
    }

    pub fn drop_next_ack(&self) {
        self.drop_acks.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryRemote {
        &self.inner
    }

    fn should_drop_ack(&self) -> bool {
        self.drop_acks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for AckLostRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for AckLostRemote {
    async fn insert(
        &self,
        collection: &str,
        row: &Document,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        let rows = self.inner.insert(collection, row, idempotency_key).await?;
        if self.should_drop_ack() {
            return Err(RemoteError::Network {
                reason: "connection reset before acknowledgment".to_string(),
            });
        }
        Ok(rows)
    }

    async fn update(
        &self,
        collection: &str,
        changes: &Document,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        self.inner
            .update(collection, changes, criteria, idempotency_key)
            .await
    }

    async fn delete(
        &self,
        collection: &str,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<(), RemoteError> {
        self.inner.delete(collection, criteria, idempotency_key).await
    }

    async fn select(
        &self,
        collection: &str,
        criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError> {
        self.inner.select(collection, criteria).await
    }
}

/// Queue whose every call fails with a storage error, for the drain-abort
/// path.
pub struct FailingQueue;

fn storage_down() -> causeway_core::errors::CausewayError {
    StoreError::Sqlite {
        message: "disk unavailable".to_string(),
    }
    .into()
}

impl DurableQueue for FailingQueue {
    fn enqueue(
        &self,
        _collection: &str,
        _mutation: Mutation,
        _idempotency_key: &str,
    ) -> CausewayResult<PendingOperation> {
        Err(storage_down())
    }

    fn list_pending(&self, _include_failed: bool) -> CausewayResult<Vec<PendingOperation>> {
        Err(storage_down())
    }

    fn mark_status(
        &self,
        _id: &str,
        _status: OperationStatus,
        _error: Option<&str>,
    ) -> CausewayResult<()> {
        Err(storage_down())
    }

    fn remove(&self, _id: &str) -> CausewayResult<()> {
        Err(storage_down())
    }

    fn pending_count(&self) -> CausewayResult<usize> {
        Err(storage_down())
    }

    fn failed_count(&self) -> CausewayResult<usize> {
        Err(storage_down())
    }

    fn reset_failed(&self) -> CausewayResult<usize> {
        Err(storage_down())
    }

    fn requeue_stale_syncing(&self) -> CausewayResult<usize> {
        Err(storage_down())
    }

    fn replace_snapshot(&self, _collection: &str, _rows: &[Document]) -> CausewayResult<()> {
        Err(storage_down())
    }

    fn read_snapshot(&self, _collection: &str) -> CausewayResult<Vec<Document>> {
        Err(storage_down())
    }
}
