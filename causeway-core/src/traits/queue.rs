use crate::errors::CausewayResult;
use crate::models::{Document, Mutation, OperationStatus, PendingOperation};

/// The durable storage boundary: crash-surviving persistence for queued
/// mutations and cached collection snapshots.
///
/// All methods are synchronous; the reference implementation is SQLite behind
/// a mutex, and on-device latencies do not warrant an async surface. Callers
/// on async tasks invoke these inline.
pub trait DurableQueue: Send + Sync {
    // --- Queue ---

    /// Persist a new Pending record and return it. Once this returns Ok the
    /// operation survives an application crash/restart.
    fn enqueue(
        &self,
        collection: &str,
        mutation: Mutation,
        idempotency_key: &str,
    ) -> CausewayResult<PendingOperation>;

    /// Records awaiting replay, in insertion order. `include_failed` widens
    /// the batch to Failed records (the retry-on-next-drain policy).
    fn list_pending(&self, include_failed: bool) -> CausewayResult<Vec<PendingOperation>>;

    /// Transition a record's status. Failed increments the retry counter and
    /// stores `error`. No-op if the id no longer exists.
    fn mark_status(
        &self,
        id: &str,
        status: OperationStatus,
        error: Option<&str>,
    ) -> CausewayResult<()>;

    /// Delete a record. Idempotent: removing a missing id is not an error.
    fn remove(&self, id: &str) -> CausewayResult<()>;

    /// Count of Pending records, via the status index rather than a scan.
    fn pending_count(&self) -> CausewayResult<usize>;

    /// Count of Failed records.
    fn failed_count(&self) -> CausewayResult<usize>;

    /// Flip every Failed record back to Pending; returns how many.
    fn reset_failed(&self) -> CausewayResult<usize>;

    /// Flip every Syncing record back to Pending; returns how many. At most
    /// one drain runs at a time, so a Syncing record observed outside a drain
    /// is a leftover from an interrupted process.
    fn requeue_stale_syncing(&self) -> CausewayResult<usize>;

    // --- Snapshots ---

    /// Atomically clear and repopulate the cached rows for one collection.
    fn replace_snapshot(&self, collection: &str, rows: &[Document]) -> CausewayResult<()>;

    /// Last cached rows for the collection, empty if none cached yet.
    fn read_snapshot(&self, collection: &str) -> CausewayResult<Vec<Document>>;
}
