//! The shared write connection all queue operations go through.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use causeway_core::errors::CausewayResult;

use crate::pragmas;
use crate::to_store_err;

/// A single SQLite connection guarded by a mutex.
///
/// The queue serves one application process; a lone write connection with a
/// busy timeout covers both the gateway's enqueues and the engine's drain
/// bookkeeping without reader/writer separation.
pub struct SharedConnection {
    conn: Mutex<Connection>,
}

impl SharedConnection {
    /// Open a connection to the given database file and apply pragmas.
    pub fn open(path: &Path) -> CausewayResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_store_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory connection (for testing).
    pub fn open_in_memory() -> CausewayResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_store_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure with the connection.
    pub fn with<F, T>(&self, f: F) -> CausewayResult<T>
    where
        F: FnOnce(&Connection) -> CausewayResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_store_err(format!("connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
