//! Error types for pagesync
//!
//! Two layers of errors live here:
//! - [`FetchError`] is the only failure a [`PageFetcher`](crate::fetch::PageFetcher)
//!   reports to the engine. It is always treated as transient and is never
//!   raised to callers of the engine; it becomes an error event instead.
//! - [`Error`] covers the fallible edges around the engine: configuration,
//!   HTTP transport and response decoding.

use thiserror::Error;

/// Failure reported by a page fetcher
///
/// Carries the human-readable description that ends up in the
/// `"Error occurred: {description}. Retrying..."` notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct FetchError {
    description: String,
}

impl FetchError {
    /// Create a fetch error from a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    /// The description reported by the fetcher
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl From<Error> for FetchError {
    fn from(err: Error) -> Self {
        Self::new(err.to_string())
    }
}

/// The main error type for pagesync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to extract records from path '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn record_extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for pagesync
pub type Result<T> = std::result::Result<T, Error>;
