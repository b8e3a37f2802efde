//! # causeway-sync
//!
//! Reconciliation layer for the Causeway offline write buffer: the sync
//! engine that drains the durable queue, the offline-aware gateway in front
//! of the remote store, the connectivity signal that triggers automatic
//! drains, and the [`Causeway`] composition root that wires them together.

pub mod connectivity;
pub mod engine;
pub mod gateway;
pub mod remote;
pub mod stack;
pub mod status;

// Re-export the most commonly used types at the crate root.
pub use connectivity::{ConnectivitySignal, ConnectivityWatcher};
pub use engine::{DrainReport, DrainStatus, SyncEngine};
pub use gateway::{OfflineGateway, OfflineNotice, SelectOptions, WriteOptions, WriteOutcome};
pub use remote::MemoryRemote;
pub use stack::Causeway;
pub use status::{StatusFeed, SubscriptionId, SyncPhase, SyncStatus};
