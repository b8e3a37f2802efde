//! v001: queue_operations.

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> CausewayResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS queue_operations (
            id              TEXT PRIMARY KEY,
            seq             INTEGER NOT NULL,
            created_at_ms   INTEGER NOT NULL,
            collection      TEXT NOT NULL,
            kind            TEXT NOT NULL,
            payload         TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending',
            retry_count     INTEGER NOT NULL DEFAULT 0,
            last_error      TEXT,
            idempotency_key TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_queue_status ON queue_operations(status);
        CREATE INDEX IF NOT EXISTS idx_queue_order
            ON queue_operations(status, created_at_ms, seq);
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
