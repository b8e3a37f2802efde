//! # causeway-store
//!
//! SQLite persistence for the offline write buffer: the durable mutation
//! queue, per-collection snapshot cache, and the monotonic enqueue counter.
//! [`QueueStore`] is the durability boundary: once an enqueue returns Ok,
//! the operation survives an application crash or restart.

mod connection;
mod pragmas;
mod store;

pub mod migrations;
pub mod queries;

pub use store::QueueStore;

use causeway_core::errors::{CausewayError, StoreError};

/// Map a low-level SQLite failure message into the workspace error type.
pub(crate) fn to_store_err(message: impl Into<String>) -> CausewayError {
    StoreError::Sqlite {
        message: message.into(),
    }
    .into()
}
