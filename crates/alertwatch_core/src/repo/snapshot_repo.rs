//! Alert snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load the `alert id -> {header, period}` map recorded by the last run.
//! - Replace it atomically with the current run's map.
//!
//! # Invariants
//! - `replace_all` is all-or-nothing.
//! - Alert ids are non-blank: writes refuse them before touching the table
//!   and reads reject rows that break the rule instead of masking them.

use crate::db::DbError;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Snapshot map keyed by alert id, ordered for deterministic iteration.
pub type SnapshotMap = BTreeMap<String, SnapshotEntry>;

/// Last-seen text of one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub header: Option<String>,
    pub period: Option<String>,
}

/// Snapshot persistence error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the persisted snapshot.
pub trait SnapshotRepository {
    fn load_all(&self) -> RepoResult<SnapshotMap>;
    fn replace_all(&self, entries: &SnapshotMap) -> RepoResult<()>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load_all(&self) -> RepoResult<SnapshotMap> {
        let mut stmt = self.conn.prepare(
            "SELECT alert_id, header, period
             FROM alert_snapshots
             ORDER BY alert_id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut entries = SnapshotMap::new();
        while let Some(row) = rows.next()? {
            let (alert_id, entry) = parse_snapshot_row(row)?;
            entries.insert(alert_id, entry);
        }

        Ok(entries)
    }

    fn replace_all(&self, entries: &SnapshotMap) -> RepoResult<()> {
        if entries.keys().any(|alert_id| is_blank_id(alert_id)) {
            return Err(RepoError::InvalidData(
                "refusing to store blank alert id".to_string(),
            ));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM alert_snapshots;", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO alert_snapshots (alert_id, header, period)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (alert_id, entry) in entries {
                insert.execute(params![
                    alert_id.as_str(),
                    entry.header.as_deref(),
                    entry.period.as_deref(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<(String, SnapshotEntry)> {
    let alert_id: String = row.get("alert_id")?;
    if is_blank_id(&alert_id) {
        return Err(RepoError::InvalidData(
            "empty alert id in alert_snapshots.alert_id".to_string(),
        ));
    }

    Ok((
        alert_id,
        SnapshotEntry {
            header: row.get("header")?,
            period: row.get("period")?,
        },
    ))
}

fn is_blank_id(alert_id: &str) -> bool {
    alert_id.trim().is_empty()
}
