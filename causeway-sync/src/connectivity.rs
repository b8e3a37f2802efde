//! Connectivity signal plumbing: a process-wide online/offline flag and the
//! watcher that turns reconnects into automatic drains.

use std::sync::Arc;

use tokio::sync::watch;

use crate::engine::SyncEngine;

/// Online/offline flag fanned out to watchers.
///
/// The platform's connectivity events feed [`set_online`](Self::set_online);
/// the gateway and watcher each hold a receiver. The flag is readable
/// synchronously at any time via [`is_online`](Self::is_online).
pub struct ConnectivitySignal {
    tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx }
    }

    /// Publish the current connectivity. Watchers only wake on transitions.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Turns offline-to-online transitions into fire-and-forget drains.
///
/// The drain is spawned rather than awaited so a slow queue never delays the
/// watcher; callers observe progress through the engine's status feed.
pub struct ConnectivityWatcher {
    engine: Arc<SyncEngine>,
    rx: watch::Receiver<bool>,
}

impl ConnectivityWatcher {
    pub fn new(engine: Arc<SyncEngine>, rx: watch::Receiver<bool>) -> Self {
        Self { engine, rx }
    }

    /// Runs until the signal's sender is dropped.
    pub async fn run(mut self) {
        let mut was_online = *self.rx.borrow_and_update();
        while self.rx.changed().await.is_ok() {
            let online = *self.rx.borrow_and_update();
            if online && !was_online {
                tracing::info!("connectivity: back online, draining queue");
                let engine = Arc::clone(&self.engine);
                tokio::spawn(async move {
                    engine.sync_pending().await;
                });
            } else if !online && was_online {
                tracing::info!("connectivity: offline, writes will queue");
            }
            was_online = online;
        }
    }
}
