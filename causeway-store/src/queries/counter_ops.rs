//! Monotonic counters; the queue sequence breaks created_at ties so replay
//! order is total even under same-millisecond enqueues.

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::to_store_err;

/// Allocate the next enqueue sequence number.
pub fn next_sequence(conn: &Connection) -> CausewayResult<i64> {
    conn.query_row(
        "INSERT INTO counters (name, value) VALUES ('queue_seq', 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1
         RETURNING value",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_store_err(e.to_string()))
}
