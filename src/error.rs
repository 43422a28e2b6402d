//! Error types for tableinfo
//!
//! Provides a unified error type for all operations.
//!
//! Structural failures (`Connection`, `Schema`, `Query`) propagate to the
//! caller. `Conversion` and `WalRead` exist so the failure can be named, but
//! the codec and the reconciler degrade them to a present-but-reduced result
//! instead of returning them from the high-level operations.

use thiserror::Error;

use crate::timestamp::ConversionError;

/// Result type alias using InspectError
pub type Result<T> = std::result::Result<T, InspectError>;

/// Unified error type for tableinfo operations
#[derive(Debug, Error)]
pub enum InspectError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Database file missing, unreadable, or not a database
    #[error("Connection error: {0}")]
    Connection(String),

    /// Requested table absent from the catalog
    #[error("Schema error: {0}")]
    Schema(String),

    /// Query referenced columns the table lacks, or failed while stepping
    #[error("Query error: {0}")]
    Query(String),

    // -------------------------------------------------------------------------
    // Degradable Errors
    // -------------------------------------------------------------------------
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("WAL read error: {0}")]
    WalRead(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InspectError {
    /// True for errors the high-level operations swallow into a degraded result
    pub fn is_degradable(&self) -> bool {
        matches!(self, InspectError::Conversion(_) | InspectError::WalRead(_))
    }
}
