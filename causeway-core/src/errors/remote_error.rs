/// Errors surfaced by the remote store boundary.
///
/// `Network` covers transport-level failures (unreachable host, reset
/// connections); `Rejected` covers the remote side's own validation, auth,
/// or conflict responses. Both trigger offline fallback on a direct write
/// and a `Failed` mark on a replay.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("remote rejected the operation: {reason}")]
    Rejected { reason: String },

    #[error("replay timed out after {seconds}s")]
    TimedOut { seconds: u64 },
}
