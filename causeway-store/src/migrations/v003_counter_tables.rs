//! v003: counters.

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::to_store_err;

pub fn migrate(conn: &Connection) -> CausewayResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS counters (
            name    TEXT PRIMARY KEY,
            value   INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
