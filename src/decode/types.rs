//! Decoder configuration

use serde::{Deserialize, Serialize};

/// Where to find records and the next cursor in a response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Path to the record array; `None` means the body itself is the array
    #[serde(default)]
    pub records_path: Option<String>,
    /// Path to the next-page cursor; missing, null or empty ends pagination
    #[serde(default = "default_next_cursor_path")]
    pub next_cursor_path: String,
    /// Field holding the record id (string or number)
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Field holding the display name
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

fn default_next_cursor_path() -> String {
    "next".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            records_path: None,
            next_cursor_path: default_next_cursor_path(),
            id_field: default_id_field(),
            name_field: default_name_field(),
        }
    }
}

impl DecodeConfig {
    /// Create a config reading records from `records_path`
    pub fn with_records_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the next cursor path
    #[must_use]
    pub fn next_cursor_path(mut self, path: impl Into<String>) -> Self {
        self.next_cursor_path = path.into();
        self
    }

    /// Set the id and display name fields
    #[must_use]
    pub fn fields(mut self, id_field: impl Into<String>, name_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self.name_field = name_field.into();
        self
    }
}
