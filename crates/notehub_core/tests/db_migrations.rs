use notehub_core::db::migrations::{latest_version, schema_version};
use notehub_core::db::{open_db, open_db_in_memory, DbError};
use notehub_core::{CoreError, ErrorKind, NoteService, RepoError};
use rusqlite::Connection;

const TABLES: [&str; 5] = [
    "users",
    "notes",
    "note_collaborators",
    "note_versions",
    "audit_log",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
    assert_index_exists(&conn, "idx_audit_log_note");
    assert_index_exists(&conn, "idx_audit_log_actor");
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO notes (uuid, owner_uuid, title, content)
             VALUES ('n-1', 'missing-owner', 't', 'c');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notehub.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    assert_table_exists(&conn_second, "note_versions");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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
fn services_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = NoteService::try_new(&conn).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Internal);
    match err {
        CoreError::Repo(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
