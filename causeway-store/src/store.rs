//! QueueStore: owns the shared connection, runs migrations on open,
//! implements the durable storage boundary.

use std::path::Path;

use causeway_core::errors::CausewayResult;
use causeway_core::models::{Document, Mutation, OperationStatus, PendingOperation};
use causeway_core::traits::DurableQueue;

use crate::connection::SharedConnection;
use crate::migrations;
use crate::queries::{counter_ops, queue_ops, snapshot_ops};

/// The durable queue store. One instance per running application.
pub struct QueueStore {
    conn: SharedConnection,
}

impl QueueStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> CausewayResult<Self> {
        let store = Self {
            conn: SharedConnection::open(path)?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> CausewayResult<Self> {
        let store = Self {
            conn: SharedConnection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> CausewayResult<()> {
        self.conn.with(migrations::run_migrations)
    }
}

impl DurableQueue for QueueStore {
    fn enqueue(
        &self,
        collection: &str,
        mutation: Mutation,
        idempotency_key: &str,
    ) -> CausewayResult<PendingOperation> {
        let op = PendingOperation::new(collection, mutation, idempotency_key);
        self.conn.with(|conn| {
            let seq = counter_ops::next_sequence(conn)?;
            queue_ops::insert_operation(conn, &op, seq)
        })?;
        tracing::debug!(id = %op.id, collection = %op.collection, kind = %op.kind(), "queue: enqueued");
        Ok(op)
    }

    fn list_pending(&self, include_failed: bool) -> CausewayResult<Vec<PendingOperation>> {
        self.conn
            .with(|conn| queue_ops::list_pending(conn, include_failed))
    }

    fn mark_status(
        &self,
        id: &str,
        status: OperationStatus,
        error: Option<&str>,
    ) -> CausewayResult<()> {
        self.conn
            .with(|conn| queue_ops::mark_status(conn, id, status, error))
    }

    fn remove(&self, id: &str) -> CausewayResult<()> {
        self.conn.with(|conn| queue_ops::remove(conn, id))
    }

    fn pending_count(&self) -> CausewayResult<usize> {
        self.conn
            .with(|conn| queue_ops::count_by_status(conn, OperationStatus::Pending))
    }

    fn failed_count(&self) -> CausewayResult<usize> {
        self.conn
            .with(|conn| queue_ops::count_by_status(conn, OperationStatus::Failed))
    }

    fn reset_failed(&self) -> CausewayResult<usize> {
        let requeued = self.conn.with(|conn| {
            queue_ops::retag_status(conn, OperationStatus::Failed, OperationStatus::Pending)
        })?;
        if requeued > 0 {
            tracing::info!("queue: reset {requeued} failed operations to pending");
        }
        Ok(requeued)
    }

    fn requeue_stale_syncing(&self) -> CausewayResult<usize> {
        let requeued = self.conn.with(|conn| {
            queue_ops::retag_status(conn, OperationStatus::Syncing, OperationStatus::Pending)
        })?;
        if requeued > 0 {
            tracing::warn!("queue: requeued {requeued} operations left syncing by an interrupted drain");
        }
        Ok(requeued)
    }

    fn replace_snapshot(&self, collection: &str, rows: &[Document]) -> CausewayResult<()> {
        self.conn
            .with(|conn| snapshot_ops::replace_snapshot(conn, collection, rows))
    }

    fn read_snapshot(&self, collection: &str) -> CausewayResult<Vec<Document>> {
        self.conn
            .with(|conn| snapshot_ops::read_snapshot(conn, collection))
    }
}
