use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CausewayError, StoreError};
use crate::models::{Mutation, OperationKind};

/// Lifecycle state of a queued operation.
///
/// There is no stored "synced" terminal state: a successful replay deletes
/// the record outright, so presence in the queue means not-yet-applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Syncing,
    Failed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationStatus {
    type Err = CausewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "syncing" => Ok(Self::Syncing),
            "failed" => Ok(Self::Failed),
            other => Err(StoreError::CorruptRecord {
                id: String::new(),
                reason: format!("unknown operation status '{other}'"),
            }
            .into()),
        }
    }
}

/// A single queued mutation awaiting replay against the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Globally unique, generated at enqueue time.
    pub id: String,
    /// Enqueue timestamp; replay order is (created_at, sequence).
    pub created_at: DateTime<Utc>,
    /// Remote table/collection the mutation targets.
    pub collection: String,
    /// The buffered write itself, tagged by kind.
    pub mutation: Mutation,
    pub status: OperationStatus,
    /// Incremented on every failed replay attempt; never capped.
    pub retry_count: u32,
    /// Most recent failure message, for diagnostics.
    pub last_error: Option<String>,
    /// Client-generated token the remote boundary deduplicates on, so a
    /// replay whose first attempt lost its acknowledgment cannot double-apply.
    pub idempotency_key: String,
}

impl PendingOperation {
    /// Construct a fresh record: status Pending, zero retries, a new id.
    pub fn new(
        collection: impl Into<String>,
        mutation: Mutation,
        idempotency_key: impl Into<String>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: generate_id(created_at),
            created_at,
            collection: collection.into(),
            mutation,
            status: OperationStatus::Pending,
            retry_count: 0,
            last_error: None,
            idempotency_key: idempotency_key.into(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.mutation.kind()
    }
}

/// Time-based id with a random suffix, collision-safe under rapid succession.
fn generate_id(created_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", created_at.timestamp_millis(), &suffix[..8])
}
