//! Shared fixtures for the integration tests
//!
//! Every fixture writes real SQLite files into a `TempDir` that the caller
//! keeps alive for the duration of the test.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tableinfo::wal::wal_path_for;
use tempfile::TempDir;

/// Message table in the app's Core Data layout
pub const MESSAGE_DDL: &str =
    "CREATE TABLE ZMESSAGE (Z_PK INTEGER PRIMARY KEY, Z_OPT INTEGER, ZTIMESTAMP INTEGER, ZTEXT TEXT)";

/// `(Z_PK, Z_OPT, ZTIMESTAMP, ZTEXT)`
pub type MessageRow<'a> = (i64, i64, i64, Option<&'a str>);

// =============================================================================
// Paths
// =============================================================================

pub fn setup_temp_db() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("talk.sqlite");
    (temp_dir, db_path)
}

// =============================================================================
// Rollback-journal Databases
// =============================================================================

/// Create a database at `path` by running each statement in order
pub fn create_db(path: &Path, statements: &[&str]) {
    let conn = Connection::open(path).unwrap();
    for sql in statements {
        conn.execute(sql, []).unwrap();
    }
}

pub fn insert_messages(conn: &Connection, rows: &[MessageRow]) {
    for (pk, opt, ts, text) in rows {
        conn.execute(
            "INSERT INTO ZMESSAGE (Z_PK, Z_OPT, ZTIMESTAMP, ZTEXT) VALUES (?1, ?2, ?3, ?4)",
            params![pk, opt, ts, text],
        )
        .unwrap();
    }
}

/// Create a ZMESSAGE database at `path`
pub fn create_message_db(path: &Path, rows: &[MessageRow]) {
    let conn = Connection::open(path).unwrap();
    conn.execute(MESSAGE_DDL, []).unwrap();
    insert_messages(&conn, rows);
}

/// Create a ZMESSAGE database as the `-wal` sibling of `db_path`
///
/// This is the layout some acquisition tools produce: the sibling is a
/// database in its own right rather than a frame log.
pub fn create_message_sibling(db_path: &Path, rows: &[MessageRow]) -> PathBuf {
    let wal_path = wal_path_for(db_path);
    create_message_db(&wal_path, rows);
    wal_path
}

/// Write raw bytes as the `-wal` sibling of `db_path`
pub fn write_sibling_bytes(db_path: &Path, bytes: &[u8]) -> PathBuf {
    let wal_path = wal_path_for(db_path);
    fs::write(&wal_path, bytes).unwrap();
    wal_path
}

// =============================================================================
// Live WAL Databases
// =============================================================================

/// Run a pragma and drain whatever rows it returns
pub fn run_pragma(conn: &Connection, pragma: &str) {
    let mut stmt = conn.prepare(&format!("PRAGMA {}", pragma)).unwrap();
    let mut rows = stmt.query([]).unwrap();
    while rows.next().unwrap().is_some() {}
}

/// A WAL-mode ZMESSAGE database with uncheckpointed frames
///
/// The main file holds rows 1-3. The WAL holds rows 4 and 5 plus an edit of
/// row 1's text. The returned connection must stay open: closing the last
/// connection checkpoints the WAL and deletes it.
pub fn create_live_wal_db(path: &Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    run_pragma(&conn, "journal_mode = WAL");
    run_pragma(&conn, "wal_autocheckpoint = 0");

    conn.execute(MESSAGE_DDL, []).unwrap();
    insert_messages(
        &conn,
        &[
            (1, 0, 1_704_034_800_000_000, Some("one")),
            (2, 0, 1_704_034_801_000_000, Some("two")),
            (3, 0, 1_704_034_802_000_000, Some("three")),
        ],
    );
    run_pragma(&conn, "wal_checkpoint(TRUNCATE)");

    insert_messages(
        &conn,
        &[
            (4, 0, 1_704_034_803_000_000, Some("four")),
            (5, 0, 1_704_034_804_000_000, Some("five")),
        ],
    );
    conn.execute("UPDATE ZMESSAGE SET ZTEXT = 'edited' WHERE Z_PK = 1", [])
        .unwrap();

    conn
}

/// A WAL-mode `notes (body)` table with no primary key
///
/// `checkpointed` rows land in the main file, `pending` rows stay in the
/// WAL. Keep the returned connection open for the WAL to survive.
pub fn create_live_wal_notes(path: &Path, checkpointed: &[&str], pending: &[&str]) -> Connection {
    let conn = Connection::open(path).unwrap();
    run_pragma(&conn, "journal_mode = WAL");
    run_pragma(&conn, "wal_autocheckpoint = 0");

    conn.execute("CREATE TABLE notes (body TEXT)", []).unwrap();
    for body in checkpointed {
        conn.execute("INSERT INTO notes VALUES (?1)", params![body]).unwrap();
    }
    run_pragma(&conn, "wal_checkpoint(TRUNCATE)");

    for body in pending {
        conn.execute("INSERT INTO notes VALUES (?1)", params![body]).unwrap();
    }

    conn
}
