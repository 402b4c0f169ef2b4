//! Common types used throughout pagesync
//!
//! Records and pages flow from a fetcher into the engine and from the engine
//! out to subscribers, so they are defined here rather than in either module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Records and Pages
// ============================================================================

/// A single listed record
///
/// Identity is `id`: two records with the same id are the same logical
/// record, whichever page they arrive on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier
    pub id: String,
    /// Name shown to the user
    pub display_name: String,
}

impl Record {
    /// Create a new record
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Result of one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Records in server order
    pub records: Vec<Record>,
    /// Cursor for the following page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl Page {
    /// Create a page
    pub fn new(records: Vec<Record>, next_cursor: Option<String>) -> Self {
        Self {
            records,
            next_cursor,
        }
    }

    /// Create a page that continues at `cursor`
    pub fn with_next(records: Vec<Record>, cursor: impl Into<String>) -> Self {
        Self::new(records, Some(cursor.into()))
    }

    /// Create the final page
    pub fn last(records: Vec<Record>) -> Self {
        Self::new(records, None)
    }

    /// Check if this is the final page
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    /// Check if the page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff between automatic retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    #[default]
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
