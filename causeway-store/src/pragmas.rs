//! PRAGMA configuration applied to the queue connection.
//!
//! WAL mode, NORMAL sync, 5s busy_timeout, foreign_keys ON.

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::to_store_err;

/// Apply safety and contention pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> CausewayResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_store_err(e.to_string()))?;
    Ok(())
}
