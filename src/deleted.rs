//! Deleted record finder
//!
//! Locates messages the app has flagged as deleted but whose text is still
//! present in the row. Only tables that follow the sentinel convention
//! (by default `Z_OPT = 1` with `ZTEXT`, `ZTIMESTAMP`, `Z_PK`) qualify.

use serde::Serialize;

use crate::config::DeletionConvention;
use crate::error::{InspectError, Result};
use crate::storage::{quote_ident, ColumnSchemaReader, Database};
use crate::value::Value;

/// A deleted-but-recoverable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedRecord {
    pub timestamp: Value,
    pub text: String,
    pub row_id: Value,
}

/// Runs the deleted-message query against one database
pub struct DeletedRecordFinder<'a> {
    db: &'a Database,
    convention: &'a DeletionConvention,
}

impl<'a> DeletedRecordFinder<'a> {
    pub fn new(db: &'a Database, convention: &'a DeletionConvention) -> Self {
        Self { db, convention }
    }

    /// Deleted rows with text, most recent first
    ///
    /// Fails with `Schema` if the table is missing and with `Query` if it
    /// lacks any of the convention's columns.
    pub fn find_deleted(&self, table: &str) -> Result<Vec<DeletedRecord>> {
        self.check_columns(table)?;

        let c = self.convention;
        let sql = format!(
            "SELECT {ts}, {text}, {id} FROM {table} \
             WHERE {sentinel} = ?1 AND {text} IS NOT NULL \
             ORDER BY {ts} DESC",
            ts = quote_ident(&c.timestamp_column),
            text = quote_ident(&c.text_column),
            id = quote_ident(&c.id_column),
            sentinel = quote_ident(&c.sentinel_column),
            table = quote_ident(table),
        );

        let query_err = |e: rusqlite::Error| InspectError::Query(format!("deleted scan on {} failed: {}", table, e));

        let mut stmt = self.db.connection().prepare(&sql).map_err(query_err)?;
        let records = stmt
            .query_map([c.marker], |row| {
                Ok(DeletedRecord {
                    timestamp: Value::from(row.get_ref(0)?),
                    text: Value::from(row.get_ref(1)?).to_text_lossy(),
                    row_id: Value::from(row.get_ref(2)?),
                })
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(query_err)?;

        Ok(records)
    }

    fn check_columns(&self, table: &str) -> Result<()> {
        let columns = ColumnSchemaReader::new(self.db).read(table)?;
        let c = self.convention;

        let missing: Vec<&str> = [
            &c.sentinel_column,
            &c.text_column,
            &c.timestamp_column,
            &c.id_column,
        ]
        .into_iter()
        .filter(|wanted| !columns.iter().any(|col| col.name.eq_ignore_ascii_case(wanted)))
        .map(|s| s.as_str())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InspectError::Query(format!(
                "table {} lacks deleted-message column(s): {}",
                table,
                missing.join(", ")
            )))
        }
    }
}
