use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Sync engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether Failed records are included in the next drain batch. When
    /// false, Failed records stay invisible to drains until an explicit
    /// `reset_failed` call.
    pub retry_failed: bool,
    /// Upper bound on a single record's replay, in seconds. A timeout counts
    /// as that record's failure; the drain continues. None means the remote
    /// call's own timeout (if any) is the only bound.
    pub replay_timeout_secs: Option<u64>,
    /// Initial connectivity assumption before the platform signal reports.
    pub assume_online: bool,
}

impl SyncConfig {
    /// The replay bound as a [`Duration`], if configured.
    pub fn replay_timeout(&self) -> Option<Duration> {
        self.replay_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry_failed: defaults::DEFAULT_RETRY_FAILED,
            replay_timeout_secs: defaults::DEFAULT_REPLAY_TIMEOUT_SECS,
            assume_online: defaults::DEFAULT_ASSUME_ONLINE,
        }
    }
}
