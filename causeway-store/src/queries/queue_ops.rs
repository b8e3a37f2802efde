//! Insert, list, status transitions, and counts for queued operations.

use std::str::FromStr;

use chrono::TimeZone;
use rusqlite::{params, Connection};

use causeway_core::errors::{CausewayResult, StoreError};
use causeway_core::models::{Mutation, OperationStatus, PendingOperation};

use crate::to_store_err;

/// Persist a new record with its allocated sequence number.
pub fn insert_operation(conn: &Connection, op: &PendingOperation, seq: i64) -> CausewayResult<()> {
    let payload = serde_json::to_string(&op.mutation)?;
    conn.execute(
        "INSERT INTO queue_operations (
            id, seq, created_at_ms, collection, kind, payload,
            status, retry_count, last_error, idempotency_key
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            op.id,
            seq,
            op.created_at.timestamp_millis(),
            op.collection,
            op.kind().as_str(),
            payload,
            op.status.as_str(),
            op.retry_count,
            op.last_error,
            op.idempotency_key,
        ],
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Records awaiting replay, in insertion order (created_at, then sequence).
pub fn list_pending(
    conn: &Connection,
    include_failed: bool,
) -> CausewayResult<Vec<PendingOperation>> {
    let sql = if include_failed {
        "SELECT id, created_at_ms, collection, payload, status, retry_count,
                last_error, idempotency_key
         FROM queue_operations
         WHERE status IN ('pending', 'failed')
         ORDER BY created_at_ms ASC, seq ASC"
    } else {
        "SELECT id, created_at_ms, collection, payload, status, retry_count,
                last_error, idempotency_key
         FROM queue_operations
         WHERE status = 'pending'
         ORDER BY created_at_ms ASC, seq ASC"
    };
    let mut stmt = conn.prepare(sql).map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok(row_to_operation(row)))
        .map_err(|e| to_store_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_store_err(e.to_string()))?;
    rows.into_iter().collect()
}

/// Transition a record's status. Failed bumps the retry counter and stores
/// the error message. A missing id is a no-op: the record may have been
/// removed by a concurrent successful replay.
pub fn mark_status(
    conn: &Connection,
    id: &str,
    status: OperationStatus,
    error: Option<&str>,
) -> CausewayResult<()> {
    match status {
        OperationStatus::Failed => conn.execute(
            "UPDATE queue_operations
             SET status = ?2, retry_count = retry_count + 1, last_error = ?3
             WHERE id = ?1",
            params![id, status.as_str(), error],
        ),
        _ => conn.execute(
            "UPDATE queue_operations SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        ),
    }
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Delete a record. Idempotent: deleting a missing id affects zero rows.
pub fn remove(conn: &Connection, id: &str) -> CausewayResult<()> {
    conn.execute("DELETE FROM queue_operations WHERE id = ?1", params![id])
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}

/// Count records with the given status via the status index.
pub fn count_by_status(conn: &Connection, status: OperationStatus) -> CausewayResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM queue_operations WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    Ok(count as usize)
}

/// Flip every record with status `from` to status `to`; returns how many.
pub fn retag_status(
    conn: &Connection,
    from: OperationStatus,
    to: OperationStatus,
) -> CausewayResult<usize> {
    conn.execute(
        "UPDATE queue_operations SET status = ?2 WHERE status = ?1",
        params![from.as_str(), to.as_str()],
    )
    .map_err(|e| to_store_err(e.to_string()))
}

/// Parse a row from queue_operations into a PendingOperation.
fn row_to_operation(row: &rusqlite::Row<'_>) -> CausewayResult<PendingOperation> {
    let id: String = row.get(0).map_err(|e| to_store_err(e.to_string()))?;
    let created_at_ms: i64 = row.get(1).map_err(|e| to_store_err(e.to_string()))?;
    let collection: String = row.get(2).map_err(|e| to_store_err(e.to_string()))?;
    let payload: String = row.get(3).map_err(|e| to_store_err(e.to_string()))?;
    let status_str: String = row.get(4).map_err(|e| to_store_err(e.to_string()))?;
    let retry_count: i64 = row.get(5).map_err(|e| to_store_err(e.to_string()))?;
    let last_error: Option<String> = row.get(6).map_err(|e| to_store_err(e.to_string()))?;
    let idempotency_key: String = row.get(7).map_err(|e| to_store_err(e.to_string()))?;

    let mutation: Mutation = serde_json::from_str(&payload).map_err(|e| {
        StoreError::CorruptRecord {
            id: id.clone(),
            reason: format!("payload is not a valid mutation: {e}"),
        }
    })?;
    let status = OperationStatus::from_str(&status_str).map_err(|_| {
        StoreError::CorruptRecord {
            id: id.clone(),
            reason: format!("unknown status '{status_str}'"),
        }
    })?;
    let created_at = chrono::Utc
        .timestamp_millis_opt(created_at_ms)
        .single()
        .ok_or_else(|| StoreError::CorruptRecord {
            id: id.clone(),
            reason: format!("timestamp {created_at_ms} out of range"),
        })?;

    Ok(PendingOperation {
        id,
        created_at,
        collection,
        mutation,
        status,
        retry_count: retry_count as u32,
        last_error,
        idempotency_key,
    })
}
