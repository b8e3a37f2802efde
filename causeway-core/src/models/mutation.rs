use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CausewayError, StoreError};

/// An opaque row: field name to JSON value. The queue is schema-agnostic;
/// payloads are validated only where they are handed to the remote store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field equality criteria identifying the target row(s) of an update or
/// delete. Same shape as [`Document`]; semantics belong to the remote side.
pub type MatchCriteria = serde_json::Map<String, serde_json::Value>;

/// Tag determining replay semantics of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = CausewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(StoreError::CorruptRecord {
                id: String::new(),
                reason: format!("unknown operation kind '{other}'"),
            }
            .into()),
        }
    }
}

/// A single buffered write, tagged by kind.
///
/// Insert carries the full row to create. Update carries the full set of
/// fields to overwrite plus the criteria locating the target row. Delete
/// carries only the criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    Insert { row: Document },
    Update { changes: Document, criteria: MatchCriteria },
    Delete { criteria: MatchCriteria },
}

impl Mutation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Insert { .. } => OperationKind::Insert,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }
}
