//! Error taxonomy: per-domain enums wrapped by [`CausewayError`].

mod remote_error;
mod store_error;

pub use remote_error::RemoteError;
pub use store_error::StoreError;

/// Result alias used across the workspace.
pub type CausewayResult<T> = Result<T, CausewayError>;

/// Top-level error for the Causeway workspace.
#[derive(Debug, thiserror::Error)]
pub enum CausewayError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("offline and fallback disabled for collection '{collection}'")]
    Offline { collection: String },

    #[error("collection name must not be empty")]
    EmptyCollection,
}
