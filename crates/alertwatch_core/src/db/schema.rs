//! Snapshot-store schema bootstrap.
//!
//! # Invariants
//! - `PRAGMA user_version` is `0` for a fresh file and `SCHEMA_VERSION` once
//!   the snapshot table exists.
//! - A file stamped with a newer version is refused, never rewritten.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SNAPSHOT_TABLE_SQL: &str = include_str!("alert_snapshots.sql");

/// Creates the snapshot table on a fresh database and stamps its version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
pub(super) fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SNAPSHOT_TABLE_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=db_schema module=db status=ok from_version={} to_version={}",
        found, SCHEMA_VERSION
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_stamps_fresh_database_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute("INSERT INTO alert_snapshots (alert_id) VALUES ('a');", [])
            .unwrap();

        ensure_schema(&mut conn).unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM alert_snapshots;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(rows, 1);
    }
}
