use async_trait::async_trait;

use crate::errors::RemoteError;
use crate::models::{Document, MatchCriteria};

/// The remote store boundary: per-collection mutations and reads against the
/// backend this buffer reconciles with.
///
/// Each call is atomic on the remote side. The remote is NOT assumed
/// idempotent on its own; `idempotency_key` is the client-generated
/// deduplication handle implementations are expected to honor, so a replayed
/// mutation whose first attempt succeeded without an acknowledgment does not
/// apply twice. Errors surface as [`RemoteError`] values, never as silent
/// empty success.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a row; returns the created row(s) as the remote reports them.
    async fn insert(
        &self,
        collection: &str,
        row: &Document,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError>;

    /// Overwrite fields on the row(s) matching `criteria`.
    async fn update(
        &self,
        collection: &str,
        changes: &Document,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError>;

    /// Delete the row(s) matching `criteria`.
    async fn delete(
        &self,
        collection: &str,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<(), RemoteError>;

    /// Fetch rows; `criteria` of None means the whole collection.
    async fn select(
        &self,
        collection: &str,
        criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError>;
}
