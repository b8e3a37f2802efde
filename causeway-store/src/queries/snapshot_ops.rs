//! Per-collection snapshot cache: clear-then-bulk-insert replacement and
//! ordered reads. Cached rows are never reconciled with queued writes.

use chrono::Utc;
use rusqlite::{params, Connection};

use causeway_core::errors::CausewayResult;
use causeway_core::models::Document;

use crate::to_store_err;

/// Atomically clear and repopulate the cached rows for one collection.
pub fn replace_snapshot(
    conn: &Connection,
    collection: &str,
    rows: &[Document],
) -> CausewayResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_store_err(format!("replace_snapshot begin: {e}")))?;

    match replace_snapshot_inner(&tx, collection, rows) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_store_err(format!("replace_snapshot commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn replace_snapshot_inner(
    conn: &Connection,
    collection: &str,
    rows: &[Document],
) -> CausewayResult<()> {
    conn.execute(
        "DELETE FROM snapshot_rows WHERE collection = ?1",
        params![collection],
    )
    .map_err(|e| to_store_err(e.to_string()))?;

    let cached_at = Utc::now().timestamp_millis();
    for (position, row) in rows.iter().enumerate() {
        let row_json = serde_json::to_string(row)?;
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_rows
                (collection, row_key, position, row_json, cached_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                collection,
                row_key(row, position),
                position as i64,
                row_json,
                cached_at
            ],
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    }
    Ok(())
}

/// Last cached rows for the collection, in cached order.
pub fn read_snapshot(conn: &Connection, collection: &str) -> CausewayResult<Vec<Document>> {
    let mut stmt = conn
        .prepare(
            "SELECT row_json FROM snapshot_rows
             WHERE collection = ?1
             ORDER BY position ASC",
        )
        .map_err(|e| to_store_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![collection], |row| row.get::<_, String>(0))
        .map_err(|e| to_store_err(e.to_string()))?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| to_store_err(e.to_string()))?;

    rows.iter()
        .map(|json| serde_json::from_str(json).map_err(Into::into))
        .collect()
}

/// Rows are keyed by their `id` field when present, else by position.
fn row_key(row: &Document, position: usize) -> String {
    match row.get("id") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => format!("#{position}"),
    }
}
