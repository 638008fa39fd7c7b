use rusqlite::Connection;
use tasklist_core::db::migrations::latest_version;
use tasklist_core::db::{open_db, open_db_in_memory, DbError};
use tasklist_core::{open_task_store, KeyValueStore, SqliteKvStore, TaskFilter, TASKS_KEY};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries'
            )",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_failure_names_the_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("tasks.db");

    match open_db(&path).unwrap_err() {
        DbError::Open { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tasks_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.db");

    let mut store = open_task_store(&path).unwrap();
    assert!(store.is_empty());
    let milk = store.add("Buy milk").unwrap();
    let dog = store.add("Walk dog").unwrap();
    store.toggle_completion(&dog.id).unwrap();
    drop(store);

    let reopened = open_task_store(&path).unwrap();
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.filter(TaskFilter::Active), vec![milk]);
    assert_eq!(reopened.filter(TaskFilter::Completed)[0].id, dog.id);
}

#[test]
fn stored_value_uses_plain_json_array_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("format.db");

    let mut store = open_task_store(&path).unwrap();
    let task = store.add("Buy milk").unwrap();
    drop(store);

    let kv = SqliteKvStore::open(&path).unwrap();
    let raw = kv.get(TASKS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "id": task.id, "text": "Buy milk", "completed": false }])
    );
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
