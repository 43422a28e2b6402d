//! Storage Module
//!
//! Read-only access to the main database file.
//!
//! ## Responsibilities
//! - Open the main file without folding in its `-wal` sibling
//! - Enumerate tables and count rows
//! - Fetch rows and primary-key sets in storage-natural order
//! - Fetch rows within an inclusive key range
//! - Introspect column metadata from the catalog
//!
//! ## Open Mode
//! The main file is opened as a `file:` URI with `mode=ro&immutable=1`.
//! `immutable` makes SQLite skip locking and ignore any `-wal` / `-shm`
//! files, so the "main" view is exactly what has been checkpointed into the
//! database file. Nothing in this crate ever writes to the source files.

pub(crate) mod catalog;
pub(crate) mod connection;

pub use catalog::{Column, ColumnSchemaReader};
pub use connection::{quote_ident, read_only_uri, Database, RowRange};
