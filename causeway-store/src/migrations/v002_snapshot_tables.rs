//! v002: snapshot_rows.

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> CausewayResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshot_rows (
            collection      TEXT NOT NULL,
            row_key         TEXT NOT NULL,
            position        INTEGER NOT NULL,
            row_json        TEXT NOT NULL,
            cached_at_ms    INTEGER NOT NULL,
            PRIMARY KEY (collection, row_key)
        );

        CREATE INDEX IF NOT EXISTS idx_snapshot_collection ON snapshot_rows(collection);
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
