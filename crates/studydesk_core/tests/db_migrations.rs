use rusqlite::Connection;
use studydesk_core::db::migrations::latest_version;
use studydesk_core::db::{open_db, open_db_in_memory, DbError};
use studydesk_core::{KeyValueBacking, SqliteKvBacking, TASKS_KEY};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn reopening_a_database_keeps_stored_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studydesk.db");

    let backing = SqliteKvBacking::open(&path).unwrap();
    backing.set(TASKS_KEY, "[]").unwrap();
    drop(backing);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    drop(conn);

    let backing = SqliteKvBacking::open(&path).unwrap();
    assert_eq!(backing.get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("newer StudyDesk"), "{err}");
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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
