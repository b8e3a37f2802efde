//! Data model for the offline write buffer.

mod mutation;
mod pending_operation;

pub use mutation::{Document, MatchCriteria, Mutation, OperationKind};
pub use pending_operation::{OperationStatus, PendingOperation};
