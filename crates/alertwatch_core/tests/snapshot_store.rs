use alertwatch_core::db::{open_db, open_db_in_memory, DbError, SCHEMA_VERSION};
use alertwatch_core::{
    decode_feed, AlertChange, RawAlert, RepoError, SnapshotEntry, SnapshotMap,
    SnapshotRepository, SnapshotService, SqliteSnapshotRepository,
};
use rusqlite::Connection;

fn entry(header: &str, period: Option<&str>) -> SnapshotEntry {
    SnapshotEntry {
        header: Some(header.to_string()),
        period: period.map(str::to_string),
    }
}

#[test]
fn open_db_in_memory_creates_current_schema() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);

    let repo = SqliteSnapshotRepository::new(&conn);
    assert!(repo.load_all().unwrap().is_empty());
}

#[test]
fn replace_all_overwrites_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::new(&conn);

    let mut first = SnapshotMap::new();
    first.insert("a".to_string(), entry("h", Some("p")));
    first.insert("b".to_string(), entry("h", None));
    repo.replace_all(&first).unwrap();
    assert_eq!(repo.load_all().unwrap(), first);

    let mut second = SnapshotMap::new();
    second.insert("c".to_string(), entry("other", Some("q")));
    repo.replace_all(&second).unwrap();
    assert_eq!(repo.load_all().unwrap(), second);
}

#[test]
fn replace_all_refuses_blank_id_and_keeps_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::new(&conn);

    let mut stored = SnapshotMap::new();
    stored.insert("a".to_string(), entry("h", Some("p")));
    repo.replace_all(&stored).unwrap();

    let mut invalid = SnapshotMap::new();
    invalid.insert(String::new(), entry("h", None));
    invalid.insert("b".to_string(), entry("h", None));
    let err = repo.replace_all(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert_eq!(repo.load_all().unwrap(), stored);
}

#[test]
fn feed_entity_without_id_does_not_poison_later_runs() {
    let body = r#"{"entity": [
        {"alert": {"header_text": {"translation": [{"text": "h", "language": "en"}]}}},
        {"id": "lmm:1", "alert": {"header_text": {"translation": [{"text": "h", "language": "en"}]}}}
    ]}"#;
    let conn = open_db_in_memory().unwrap();
    let service = SnapshotService::new(SqliteSnapshotRepository::new(&conn));

    let alerts = decode_feed(body).unwrap();
    assert_eq!(service.record_run(&alerts).unwrap().statuses.len(), 1);

    let again = service.record_run(&decode_feed(body).unwrap()).unwrap();
    assert_eq!(again.change_for("lmm:1"), Some(AlertChange::Unchanged));
    assert!(!again.has_changes());
}

#[test]
fn snapshot_survives_reopen_and_drives_diff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let header = "No [7] trains between 34 St-Hudson Yards and Queensboro Plaza";

    let first_run = vec![
        RawAlert::new("lmm:1")
            .with_header(header)
            .with_active_period("Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 17"),
        RawAlert::new("lmm:2")
            .with_header(header)
            .with_active_period("Feb 25 and Mar 4, Tuesdays, 12:45 AM to 5:00 AM"),
    ];
    {
        let conn = open_db(&path).unwrap();
        let service = SnapshotService::new(SqliteSnapshotRepository::new(&conn));
        let diff = service.record_run(&first_run).unwrap();
        assert_eq!(diff.count(AlertChange::New), 2);
    }

    let second_run = vec![
        RawAlert::new("lmm:1")
            .with_header(header)
            .with_active_period("Sat 12:15 AM to Mon 5:00 AM, Feb 22 - Mar 24"),
        RawAlert::new("lmm:3").with_header(header),
    ];
    let conn = open_db(&path).unwrap();
    let service = SnapshotService::new(SqliteSnapshotRepository::new(&conn));

    let preview = service.preview_run(&second_run).unwrap();
    assert_eq!(preview.change_for("lmm:1"), Some(AlertChange::Updated));
    assert_eq!(preview.change_for("lmm:3"), Some(AlertChange::New));
    assert_eq!(preview.removed, vec!["lmm:2".to_string()]);
    assert_eq!(service.previous().unwrap().len(), 2, "preview must not persist");

    let recorded = service.record_run(&second_run).unwrap();
    assert_eq!(recorded, preview);

    let third = service.record_run(&second_run).unwrap();
    assert!(!third.has_changes());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
