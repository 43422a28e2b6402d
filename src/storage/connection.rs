//! Database handle
//!
//! Wraps a read-only rusqlite connection to the main file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, Params};
use tracing::debug;

use crate::error::{InspectError, Result};
use crate::value::{PrimaryKey, Row, Value};

/// Inclusive bounds on one integer column, typically the primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRange {
    pub column: String,
    pub start: i64,
    pub end: i64,
}

impl RowRange {
    pub fn new(column: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            column: column.into(),
            start,
            end,
        }
    }
}

/// Read-only handle on one database file
pub struct Database {
    /// Underlying connection (immutable, no locking)
    conn: Connection,

    /// Path the handle was opened from
    path: PathBuf,
}

impl Database {
    /// Open a database file read-only
    ///
    /// Fails with `Connection` if the file is missing, is not a regular file,
    /// or does not parse as a database. SQLite opens lazily, so the catalog
    /// is read once before the handle is returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InspectError::Connection(format!(
                "database file not found: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(InspectError::Connection(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        let conn = open_read_only_connection(path).map_err(|e| {
            InspectError::Connection(format!("cannot open {}: {}", path.display(), e))
        })?;

        let objects: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .map_err(|e| {
                InspectError::Connection(format!("{} is not a readable database: {}", path.display(), e))
            })?;

        debug!(path = %path.display(), objects, "opened database read-only");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path this handle was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying connection, for ad-hoc read queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// All table names, sorted
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(|e| InspectError::Query(format!("table enumeration failed: {}", e)))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| InspectError::Query(format!("table enumeration failed: {}", e)))?;

        Ok(names)
    }

    /// Exact, case-sensitive table lookup
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| InspectError::Schema(format!("catalog lookup for {} failed: {}", table, e)))?;
        Ok(count > 0)
    }

    /// Fail with `Schema` unless the table exists
    pub fn require_table(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(InspectError::Schema(format!("no such table: {}", table)))
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Total row count, independent of any display limit
    pub fn row_count(&self, table: &str) -> Result<u64> {
        self.require_table(table)?;

        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| InspectError::Query(format!("count on {} failed: {}", table, e)))?;

        Ok(count.max(0) as u64)
    }

    /// Fetch rows projected onto `columns`, in storage-natural order
    pub fn fetch_rows(&self, table: &str, columns: &[String], limit: Option<usize>) -> Result<Vec<Row>> {
        select_rows(&self.conn, table, columns, limit)
            .map_err(|e| InspectError::Query(format!("select from {} failed: {}", table, e)))
    }

    /// Number of rows whose `range.column` lies in `[range.start, range.end]`
    pub fn range_count(&self, table: &str, range: &RowRange) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} BETWEEN ?1 AND ?2",
            quote_ident(table),
            quote_ident(&range.column)
        );
        let count: i64 = self
            .conn
            .query_row(&sql, params![range.start, range.end], |row| row.get(0))
            .map_err(|e| InspectError::Query(format!("range count on {} failed: {}", table, e)))?;

        Ok(count.max(0) as u64)
    }

    /// Rows whose `range.column` lies in `[range.start, range.end]`
    ///
    /// Bounds are bound as parameters. The caller checks that the column
    /// exists: SQLite reads an unknown double-quoted name as a string literal.
    pub fn fetch_range(
        &self,
        table: &str,
        columns: &[String],
        range: &RowRange,
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        let sql = range_sql(table, columns, &range.column, limit);
        query_rows(&self.conn, &sql, params![range.start, range.end])
            .map_err(|e| InspectError::Query(format!("range select from {} failed: {}", table, e)))
    }

    /// Every primary-key tuple in the table, ignoring any display limit
    pub fn fetch_keys(&self, table: &str, key_columns: &[String]) -> Result<HashSet<PrimaryKey>> {
        let rows = select_rows(&self.conn, table, key_columns, None)
            .map_err(|e| InspectError::Query(format!("key scan on {} failed: {}", table, e)))?;

        Ok(rows.into_iter().map(|row| PrimaryKey::new(row.0)).collect())
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Quote an SQL identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `file:` URI that opens `path` read-only and immutable
pub fn read_only_uri(path: &Path) -> String {
    let mut uri = String::from("file:");
    for ch in path.to_string_lossy().chars() {
        match ch {
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3f"),
            '#' => uri.push_str("%23"),
            _ => uri.push(ch),
        }
    }
    uri.push_str("?mode=ro&immutable=1");
    uri
}

/// Open any database file the way the main file is opened
pub(crate) fn open_read_only_connection(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        read_only_uri(path),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

fn projection_sql(table: &str, columns: &[String]) -> String {
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("SELECT {} FROM {}", projection, quote_ident(table))
}

fn push_limit(sql: &mut String, limit: Option<usize>) {
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }
}

/// `SELECT <columns> FROM <table> [LIMIT n]`, with an empty projection meaning `*`
pub(crate) fn select_sql(table: &str, columns: &[String], limit: Option<usize>) -> String {
    let mut sql = projection_sql(table, columns);
    push_limit(&mut sql, limit);
    sql
}

/// `select_sql` filtered by `<column> BETWEEN ?1 AND ?2`
pub(crate) fn range_sql(table: &str, columns: &[String], column: &str, limit: Option<usize>) -> String {
    let mut sql = projection_sql(table, columns);
    sql.push_str(&format!(" WHERE {} BETWEEN ?1 AND ?2", quote_ident(column)));
    push_limit(&mut sql, limit);
    sql
}

/// Run a projection query and materialize every row
pub(crate) fn select_rows(
    conn: &Connection,
    table: &str,
    columns: &[String],
    limit: Option<usize>,
) -> rusqlite::Result<Vec<Row>> {
    query_rows(conn, &select_sql(table, columns, limit), [])
}

fn query_rows<P: Params>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();

    let rows = stmt.query_map(params, |row| {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(Value::from(row.get_ref(i)?));
        }
        Ok(Row::new(values))
    })?;

    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("ZMESSAGE"), "\"ZMESSAGE\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_select_sql_with_limit() {
        let cols = vec!["Z_PK".to_string(), "ZTEXT".to_string()];
        assert_eq!(
            select_sql("ZMESSAGE", &cols, Some(10)),
            "SELECT \"Z_PK\", \"ZTEXT\" FROM \"ZMESSAGE\" LIMIT 10"
        );
        assert_eq!(select_sql("t", &[], None), "SELECT * FROM \"t\"");
    }

    #[test]
    fn test_range_sql_binds_bounds() {
        let cols = vec!["Z_PK".to_string()];
        assert_eq!(
            range_sql("ZMESSAGE", &cols, "Z_PK", Some(5)),
            "SELECT \"Z_PK\" FROM \"ZMESSAGE\" WHERE \"Z_PK\" BETWEEN ?1 AND ?2 LIMIT 5"
        );
        assert_eq!(
            range_sql("t", &[], "id", None),
            "SELECT * FROM \"t\" WHERE \"id\" BETWEEN ?1 AND ?2"
        );
    }

    #[test]
    fn test_read_only_uri_escapes_reserved_characters() {
        let uri = read_only_uri(Path::new("/tmp/a?b#c%d.db"));
        assert_eq!(uri, "file:/tmp/a%3fb%23c%25d.db?mode=ro&immutable=1");
    }
}
