//! Remote-store plumbing: the shared mutation dispatcher and an in-memory
//! [`RemoteStore`] used by tests and demos.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use causeway_core::errors::RemoteError;
use causeway_core::models::{Document, MatchCriteria, Mutation};
use causeway_core::traits::RemoteStore;

/// Send one mutation to the remote store. Delete has no row payload to echo,
/// so its acknowledgment normalizes to an empty row set.
pub(crate) async fn dispatch_mutation(
    remote: &dyn RemoteStore,
    collection: &str,
    mutation: &Mutation,
    idempotency_key: &str,
) -> Result<Vec<Document>, RemoteError> {
    match mutation {
        Mutation::Insert { row } => remote.insert(collection, row, idempotency_key).await,
        Mutation::Update { changes, criteria } => {
            remote
                .update(collection, changes, criteria, idempotency_key)
                .await
        }
        Mutation::Delete { criteria } => {
            remote.delete(collection, criteria, idempotency_key).await?;
            Ok(Vec::new())
        }
    }
}

fn acquire<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn matches(row: &Document, criteria: &MatchCriteria) -> bool {
    criteria
        .iter()
        .all(|(field, expected)| row.get(field) == Some(expected))
}

/// In-memory remote store keyed by collection name.
///
/// Honors the idempotency contract of [`RemoteStore`]: a key that already
/// produced a successful application is acknowledged again without applying
/// twice. Updates and deletes that match no row are rejected, mirroring a
/// backend that refuses to ack a write it could not locate.
#[derive(Default)]
pub struct MemoryRemote {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    applied_keys: Mutex<HashSet<String>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a collection without consuming idempotency keys.
    pub fn seed(&self, collection: &str, rows: Vec<Document>) {
        acquire(&self.collections).insert(collection.to_string(), rows);
    }

    /// Current rows of a collection, empty if absent.
    pub fn rows(&self, collection: &str) -> Vec<Document> {
        acquire(&self.collections)
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn row_count(&self, collection: &str) -> usize {
        acquire(&self.collections)
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn already_applied(&self, key: &str) -> bool {
        !key.is_empty() && acquire(&self.applied_keys).contains(key)
    }

    // Keys are recorded only for applications that succeeded; a rejected call
    // leaves the key unconsumed so a replay re-attempts it.
    fn mark_applied(&self, key: &str) {
        if !key.is_empty() {
            acquire(&self.applied_keys).insert(key.to_string());
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn insert(
        &self,
        collection: &str,
        row: &Document,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        if self.already_applied(idempotency_key) {
            return Ok(vec![row.clone()]);
        }
        acquire(&self.collections)
            .entry(collection.to_string())
            .or_default()
            .push(row.clone());
        self.mark_applied(idempotency_key);
        Ok(vec![row.clone()])
    }

    async fn update(
        &self,
        collection: &str,
        changes: &Document,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<Vec<Document>, RemoteError> {
        if self.already_applied(idempotency_key) {
            return Ok(vec![changes.clone()]);
        }

        let mut collections = acquire(&self.collections);
        let mut updated = Vec::new();
        if let Some(rows) = collections.get_mut(collection) {
            for row in rows.iter_mut() {
                if matches(row, criteria) {
                    for (field, value) in changes {
                        row.insert(field.clone(), value.clone());
                    }
                    updated.push(row.clone());
                }
            }
        }
        drop(collections);

        if updated.is_empty() {
            return Err(RemoteError::Rejected {
                reason: format!("no rows in '{collection}' match the update criteria"),
            });
        }
        self.mark_applied(idempotency_key);
        Ok(updated)
    }

    async fn delete(
        &self,
        collection: &str,
        criteria: &MatchCriteria,
        idempotency_key: &str,
    ) -> Result<(), RemoteError> {
        if self.already_applied(idempotency_key) {
            return Ok(());
        }

        let mut collections = acquire(&self.collections);
        let removed = match collections.get_mut(collection) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| !matches(row, criteria));
                before - rows.len()
            }
            None => 0,
        };
        drop(collections);

        if removed == 0 {
            return Err(RemoteError::Rejected {
                reason: format!("no rows in '{collection}' match the delete criteria"),
            });
        }
        self.mark_applied(idempotency_key);
        Ok(())
    }

    async fn select(
        &self,
        collection: &str,
        criteria: Option<&MatchCriteria>,
    ) -> Result<Vec<Document>, RemoteError> {
        let rows = self.rows(collection);
        Ok(match criteria {
            Some(criteria) => rows
                .into_iter()
                .filter(|row| matches(row, criteria))
                .collect(),
            None => rows,
        })
    }
}
