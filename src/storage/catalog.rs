//! Column schema reader
//!
//! Reads column metadata through `PRAGMA table_info`.

use serde::Serialize;

use crate::error::{InspectError, Result};

use super::connection::quote_ident;
use super::Database;

/// One column as declared in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Ordinal position (0-based, declaration order)
    pub position: usize,

    pub name: String,

    /// Declared type text, possibly empty
    pub declared_type: String,

    pub not_null: bool,

    /// Default expression text as declared
    pub default_value: Option<String>,

    pub is_primary_key: bool,
}

/// Reads column metadata for tables of one database
pub struct ColumnSchemaReader<'a> {
    db: &'a Database,
}

impl<'a> ColumnSchemaReader<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Columns of `table` in declaration order
    ///
    /// The table name must match exactly; `PRAGMA table_info` itself is
    /// case-insensitive, so existence is checked against the catalog first.
    pub fn read(&self, table: &str) -> Result<Vec<Column>> {
        self.db.require_table(table)?;

        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = self
            .db
            .connection()
            .prepare(&sql)
            .map_err(|e| InspectError::Schema(format!("table_info for {} failed: {}", table, e)))?;

        let columns = stmt
            .query_map([], |row| {
                let cid: i64 = row.get(0)?;
                let pk: i64 = row.get(5)?;
                Ok(Column {
                    position: cid.max(0) as usize,
                    name: row.get(1)?,
                    declared_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    is_primary_key: pk > 0,
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| InspectError::Schema(format!("table_info for {} failed: {}", table, e)))?;

        if columns.is_empty() {
            return Err(InspectError::Schema(format!("table {} reports no columns", table)));
        }

        Ok(columns)
    }

    /// Names of the primary-key columns, in declaration order
    ///
    /// Empty for tables without a declared key (junction and attachment
    /// tables in this schema usually have none).
    pub fn primary_key_columns(&self, table: &str) -> Result<Vec<String>> {
        Ok(key_names(&self.read(table)?))
    }
}

/// Primary-key subsequence of an already-read column list
pub(crate) fn key_names(columns: &[Column]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| c.name.clone())
        .collect()
}
