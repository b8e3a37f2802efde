//! Sync status broadcasting: ephemeral drain-progress snapshots fanned out
//! synchronously to registered listeners.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Phase of the sync engine at the moment a status was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// No drain in progress.
    Idle,
    /// A drain is working through the queue.
    Syncing,
    /// The last drain aborted at the top level.
    Error,
}

/// Point-in-time sync state pushed to subscribers. Never persisted; a fresh
/// process starts over at Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Operations still waiting in the queue at emit time.
    pub pending: usize,
}

impl SyncStatus {
    pub fn idle(pending: usize) -> Self {
        Self {
            phase: SyncPhase::Idle,
            pending,
        }
    }

    pub fn syncing(pending: usize) -> Self {
        Self {
            phase: SyncPhase::Syncing,
            pending,
        }
    }

    pub fn error(pending: usize) -> Self {
        Self {
            phase: SyncPhase::Error,
            pending,
        }
    }
}

/// Handle returned by [`StatusFeed::subscribe`], accepted by
/// [`StatusFeed::unsubscribe`].
pub type SubscriptionId = u64;

type StatusListener = dyn Fn(SyncStatus) + Send + Sync;

/// Fan-out of [`SyncStatus`] values to registered callbacks.
///
/// Listeners are called synchronously on each emit, outside the internal
/// lock, so a callback may subscribe or unsubscribe without deadlocking.
/// A listener added during an emit is first called on the next emit; one
/// removed during an emit still sees the current one. A panicking listener
/// is logged and skipped rather than taking down the drain.
pub struct StatusFeed {
    listeners: Mutex<Vec<(SubscriptionId, Arc<StatusListener>)>>,
    next_id: AtomicU64,
}

impl StatusFeed {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` for every subsequent broadcast.
    pub fn subscribe(
        &self,
        callback: impl Fn(SyncStatus) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, Arc::new(callback)));
        id
    }

    /// Drop the listener with this id. Unknown ids are ignored, so calling
    /// twice is safe.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_listeners().retain(|(sid, _)| *sid != id);
    }

    /// Broadcast `status` to every currently registered listener.
    pub fn emit(&self, status: SyncStatus) {
        let snapshot: Vec<Arc<StatusListener>> = self
            .lock_listeners()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in snapshot {
            let called = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cb(status)));
            if called.is_err() {
                tracing::warn!("status: listener panicked during broadcast, skipping it");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    // The lock is never held while a callback runs, so a poisoned guard still
    // holds consistent bookkeeping.
    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Arc<StatusListener>)>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new()
    }
}
