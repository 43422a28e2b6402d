//! Configuration for tableinfo
//!
//! Centralized configuration with sensible defaults.

use crate::timestamp::{FormatTag, DEFAULT_TIMESTAMP_KEYWORDS};

/// Main configuration for an inspection session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// How rows are read out of the `-wal` sibling, when one exists
    pub wal_strategy: WalStrategy,

    // -------------------------------------------------------------------------
    // Timestamp Configuration
    // -------------------------------------------------------------------------
    /// Substrings that mark a column name as temporal (case-insensitive)
    pub timestamp_keywords: Vec<String>,

    /// Format used to render temporal cells unless a column overrides it
    pub display_format: FormatTag,

    // -------------------------------------------------------------------------
    // Deleted Record Configuration
    // -------------------------------------------------------------------------
    /// Column convention for logically deleted messages
    pub deletion: DeletionConvention,
}

/// WAL read strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalStrategy {
    /// Sniff the sibling header and pick Standalone or Overlay
    #[default]
    Auto,

    /// Open the sibling itself as a database file
    Standalone,

    /// Copy main file + sibling into a temp dir and let SQLite apply the frames
    Overlay,
}

/// Names the columns that model a logically deleted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionConvention {
    /// Sentinel column compared against `marker`
    pub sentinel_column: String,

    /// Sentinel value meaning "deleted"
    pub marker: i64,

    /// Column holding the recoverable text
    pub text_column: String,

    /// Column used for most-recent-first ordering
    pub timestamp_column: String,

    /// Row identifier column
    pub id_column: String,
}

impl Default for DeletionConvention {
    fn default() -> Self {
        Self {
            sentinel_column: "Z_OPT".to_string(),
            marker: 1,
            text_column: "ZTEXT".to_string(),
            timestamp_column: "ZTIMESTAMP".to_string(),
            id_column: "Z_PK".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wal_strategy: WalStrategy::Auto,
            timestamp_keywords: DEFAULT_TIMESTAMP_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            display_format: FormatTag::Jst,
            deletion: DeletionConvention::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the WAL read strategy
    pub fn wal_strategy(mut self, strategy: WalStrategy) -> Self {
        self.config.wal_strategy = strategy;
        self
    }

    /// Replace the timestamp keyword list
    pub fn timestamp_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.timestamp_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Append one keyword to the timestamp keyword list
    pub fn extra_timestamp_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.config.timestamp_keywords.push(keyword.into());
        self
    }

    /// Set the default display format for temporal cells
    pub fn display_format(mut self, format: FormatTag) -> Self {
        self.config.display_format = format;
        self
    }

    /// Set the deleted-message column convention
    pub fn deletion(mut self, convention: DeletionConvention) -> Self {
        self.config.deletion = convention;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
