//! Causeway: the composition root wiring store, engine, gateway, and
//! connectivity signal into one long-lived stack.

use std::path::Path;
use std::sync::Arc;

use causeway_core::config::SyncConfig;
use causeway_core::errors::CausewayResult;
use causeway_core::traits::{DurableQueue, RemoteStore};
use causeway_store::QueueStore;

use crate::connectivity::{ConnectivitySignal, ConnectivityWatcher};
use crate::engine::SyncEngine;
use crate::gateway::{OfflineGateway, OfflineNotice};

/// One assembled offline stack. Construct exactly one per application at
/// startup and pass it by reference to whatever owns the UI lifecycle.
pub struct Causeway {
    store: Arc<QueueStore>,
    engine: Arc<SyncEngine>,
    gateway: OfflineGateway,
    signal: ConnectivitySignal,
}

impl Causeway {
    /// Open a file-backed stack at `path`.
    pub fn open(
        path: impl AsRef<Path>,
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> CausewayResult<Self> {
        let store = Arc::new(QueueStore::open(path.as_ref())?);
        Ok(Self::assemble(store, remote, config))
    }

    /// Open an in-memory stack. Queue durability ends with the process; meant
    /// for tests and demos.
    pub fn open_in_memory(
        remote: Arc<dyn RemoteStore>,
        config: SyncConfig,
    ) -> CausewayResult<Self> {
        let store = Arc::new(QueueStore::open_in_memory()?);
        Ok(Self::assemble(store, remote, config))
    }

    fn assemble(store: Arc<QueueStore>, remote: Arc<dyn RemoteStore>, config: SyncConfig) -> Self {
        let signal = ConnectivitySignal::new(config.assume_online);
        let queue: Arc<dyn DurableQueue> = store.clone();
        let engine = Arc::new(SyncEngine::new(queue.clone(), remote.clone(), config));
        let gateway = OfflineGateway::new(remote, queue, signal.subscribe());
        Self {
            store,
            engine,
            gateway,
            signal,
        }
    }

    /// Spawn the reconnect watcher on the current runtime. The handle ends
    /// when the stack (and with it the signal) is dropped.
    pub fn spawn_watcher(&self) -> tokio::task::JoinHandle<()> {
        let watcher = ConnectivityWatcher::new(self.engine.clone(), self.signal.subscribe());
        tokio::spawn(watcher.run())
    }

    /// Install the offline notice hook on the gateway.
    pub fn set_offline_notice(&mut self, hook: impl Fn(&OfflineNotice) + Send + Sync + 'static) {
        self.gateway.set_offline_notice(hook);
    }

    pub fn gateway(&self) -> &OfflineGateway {
        &self.gateway
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn signal(&self) -> &ConnectivitySignal {
        &self.signal
    }

    /// Direct handle to the store for maintenance calls such as
    /// [`reset_failed`](causeway_core::traits::DurableQueue::reset_failed).
    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    /// Queued-but-unsynced count for first paint, before any broadcast.
    pub fn pending_count(&self) -> CausewayResult<usize> {
        self.engine.pending_count()
    }
}
