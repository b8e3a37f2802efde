//! # causeway-core
//!
//! Foundation crate for the Causeway offline write buffer.
//! Defines the data model, traits, errors, and config.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SyncConfig;
pub use errors::{CausewayError, CausewayResult, RemoteError, StoreError};
pub use models::{
    Document, MatchCriteria, Mutation, OperationKind, OperationStatus, PendingOperation,
};
pub use traits::{DurableQueue, RemoteStore};
