//! Default values for [`super::SyncConfig`].

/// Failed records are retried on the next drain unless configured otherwise.
pub const DEFAULT_RETRY_FAILED: bool = true;

/// No per-record replay timeout unless configured.
pub const DEFAULT_REPLAY_TIMEOUT_SECS: Option<u64> = None;

/// Assume connectivity at startup until the platform signal says otherwise.
pub const DEFAULT_ASSUME_ONLINE: bool = true;
