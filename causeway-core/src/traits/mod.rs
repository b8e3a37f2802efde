//! The two abstract seams: durable local storage and the remote store.

mod queue;
mod remote;

pub use queue::DurableQueue;
pub use remote::RemoteStore;
