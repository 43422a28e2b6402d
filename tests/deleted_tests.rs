//! Tests for the deleted record finder
//!
//! These tests verify:
//! - Only sentinel-flagged rows with text are returned
//! - Most recent first ordering
//! - Failures for missing tables and missing columns
//! - Custom column conventions

mod common;

use common::{create_db, create_message_db, setup_temp_db};
use tableinfo::{Database, DeletedRecordFinder, DeletionConvention, InspectError, Value};

fn finder_results(db_path: &std::path::Path, table: &str, convention: &DeletionConvention) -> tableinfo::Result<Vec<tableinfo::DeletedRecord>> {
    let db = Database::open(db_path).unwrap();
    DeletedRecordFinder::new(&db, convention).find_deleted(table)
}

#[test]
fn test_finds_flagged_rows_with_text_newest_first() {
    let (_temp, db_path) = setup_temp_db();
    create_message_db(
        &db_path,
        &[
            (1, 1, 100, Some("old deleted")),
            (2, 0, 200, Some("live")),
            (3, 1, 300, Some("new deleted")),
            (4, 1, 400, None),
        ],
    );

    let records = finder_results(&db_path, "ZMESSAGE", &DeletionConvention::default()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "new deleted");
    assert_eq!(records[0].timestamp, Value::Integer(300));
    assert_eq!(records[0].row_id, Value::Integer(3));
    assert_eq!(records[1].text, "old deleted");
}

#[test]
fn test_no_deleted_rows() {
    let (_temp, db_path) = setup_temp_db();
    create_message_db(&db_path, &[(1, 0, 100, Some("live"))]);

    let records = finder_results(&db_path, "ZMESSAGE", &DeletionConvention::default()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_missing_table_is_schema_error() {
    let (_temp, db_path) = setup_temp_db();
    create_message_db(&db_path, &[]);

    assert!(matches!(
        finder_results(&db_path, "ZGONE", &DeletionConvention::default()),
        Err(InspectError::Schema(_))
    ));
}

#[test]
fn test_missing_columns_is_query_error() {
    let (_temp, db_path) = setup_temp_db();
    create_db(&db_path, &["CREATE TABLE ZCHAT (Z_PK INTEGER PRIMARY KEY, ZNAME TEXT)"]);

    let err = finder_results(&db_path, "ZCHAT", &DeletionConvention::default()).unwrap_err();

    match err {
        InspectError::Query(msg) => {
            assert!(msg.contains("Z_OPT"), "{}", msg);
            assert!(msg.contains("ZTIMESTAMP"), "{}", msg);
        }
        other => panic!("expected a query error, got {:?}", other),
    }
}

#[test]
fn test_custom_convention() {
    let (_temp, db_path) = setup_temp_db();
    create_db(
        &db_path,
        &[
            "CREATE TABLE chat_history (id INTEGER PRIMARY KEY, status INTEGER, content TEXT, created_time INTEGER)",
            "INSERT INTO chat_history VALUES (10, 9, 'gone', 5)",
            "INSERT INTO chat_history VALUES (11, 1, 'kept', 6)",
        ],
    );

    let convention = DeletionConvention {
        sentinel_column: "status".to_string(),
        marker: 9,
        text_column: "content".to_string(),
        timestamp_column: "created_time".to_string(),
        id_column: "id".to_string(),
    };

    let records = finder_results(&db_path, "chat_history", &convention).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "gone");
    assert_eq!(records[0].row_id, Value::Integer(10));
}
