//! Versioned schema migrations, tracked via PRAGMA user_version.

mod v001_queue_tables;
mod v002_snapshot_tables;
mod v003_counter_tables;

use rusqlite::Connection;

use causeway_core::errors::{CausewayResult, StoreError};

use crate::to_store_err;

type Migration = fn(&Connection) -> CausewayResult<()>;

/// All migrations in order. user_version advances past each applied entry.
const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_queue_tables::migrate),
    (2, v002_snapshot_tables::migrate),
    (3, v003_counter_tables::migrate),
];

/// Apply every migration newer than the database's current user_version.
pub fn run_migrations(conn: &Connection) -> CausewayResult<()> {
    let current = user_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| StoreError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.pragma_update(None, "user_version", *version)
            .map_err(|e| to_store_err(e.to_string()))?;
        tracing::debug!("queue: applied migration v{version}");
    }
    Ok(())
}

fn user_version(conn: &Connection) -> CausewayResult<u32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| to_store_err(e.to_string()))
}
