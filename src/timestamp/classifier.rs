//! Column classifier
//!
//! Name-based temporal column detection. Timestamps in these stores are
//! untyped integers, so the declared type says nothing; the name is all there
//! is. False positives (e.g. `ZSTARTUP_FLAGS`) are expected.

/// Keywords that mark a column as temporal, uppercase
pub const DEFAULT_TIMESTAMP_KEYWORDS: &[&str] = &[
    // General
    "TIMESTAMP",
    "TIME",
    "DATE",
    // Create / update
    "CREATED",
    "MODIFIED",
    "UPDATED",
    "LAST_UPDATED",
    "LAST_MODIFIED",
    "CREATE_TIME",
    "UPDATE_TIME",
    "MOD_TIME",
    // Core Data prefixes used by the messaging app
    "Z_TIMESTAMP",
    "ZLASTUPDATE",
    "ZLASTMODIFIED",
    "ZCREATEDAT",
    "ZUPDATEDAT",
    // Event suffixes
    "DATETIME",
    "POSTED_AT",
    "SENT_AT",
    "RECEIVED_AT",
    "DELIVERED_AT",
    "READ_AT",
    "ACCESSED_AT",
    "LOGGED_AT",
    // Date-like
    "BIRTH",
    "DEATH",
    "START",
    "END",
    "EXPIRE",
    "DEADLINE",
];

/// Decides whether a column holds timestamps
pub trait TemporalMatcher {
    fn is_temporal(&self, column_name: &str) -> bool;
}

impl<F> TemporalMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn is_temporal(&self, column_name: &str) -> bool {
        self(column_name)
    }
}

/// Case-insensitive substring matcher over a keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build from an arbitrary keyword list
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Add a keyword
    pub fn push(&mut self, keyword: impl AsRef<str>) {
        let keyword = keyword.as_ref().trim().to_uppercase();
        if !keyword.is_empty() && !self.keywords.contains(&keyword) {
            self.keywords.push(keyword);
        }
    }

    /// Builder-style `push`
    pub fn with_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.push(keyword);
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_KEYWORDS)
    }
}

impl TemporalMatcher for KeywordMatcher {
    fn is_temporal(&self, column_name: &str) -> bool {
        let upper = column_name.to_uppercase();
        self.keywords.iter().any(|k| upper.contains(k.as_str()))
    }
}

/// Classify with the built-in keyword list
pub fn classify_column(name: &str) -> bool {
    let upper = name.to_uppercase();
    DEFAULT_TIMESTAMP_KEYWORDS.iter().any(|k| upper.contains(k))
}
