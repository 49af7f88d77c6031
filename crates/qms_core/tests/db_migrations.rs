use qms_core::db::migrations::{latest_version, schema_version};
use qms_core::db::{open_db, open_db_in_memory, DbError};
use qms_core::{EventStore, RepoError, SqliteEventStore};
use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in [
        "staff",
        "compliance_event_types",
        "compliance_events",
        "attendance_records",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn migrations_seed_training_and_audit_types() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteEventStore::try_new(&conn).unwrap();

    let names = store
        .list_event_types()
        .unwrap()
        .into_iter()
        .map(|event_type| event_type.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Training".to_string(), "Audit".to_string()]);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("qms.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let type_count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM compliance_event_types;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(type_count, 2);
}

#[test]
fn concurrent_first_opens_of_fresh_file_all_succeed() {
    const OPENERS: usize = 4;

    for round in 0..10 {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("shared.sqlite3"));
        let barrier = Arc::new(Barrier::new(OPENERS));

        let handles = (0..OPENERS)
            .map(|_| {
                let path = Arc::clone(&path);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    open_db(path.as_path()).map(|conn| schema_version(&conn).unwrap())
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let version = handle
                .join()
                .unwrap()
                .unwrap_or_else(|err| panic!("round {round}: {err}"));
            assert_eq!(version, latest_version());
        }

        let conn = open_db(path.as_path()).unwrap();
        let type_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM compliance_event_types;", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(type_count, 2);
    }
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
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteEventStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
