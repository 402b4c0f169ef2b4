//! Sync configuration
//!
//! A YAML file names one page source and the retry policy the engine applies
//! to it. `load_config` parses and validates; `SyncConfig::build_fetcher`
//! turns the source section into a ready [`PageFetcher`].

use crate::decode::{DecodeConfig, PageDecoder};
use crate::engine::RetryPolicy;
use crate::error::{Error, Result};
use crate::fetch::{HttpPageFetcher, PageFetcher, SimulatedConfig, SimulatedFetcher};
use crate::http::{HttpClient, HttpClientConfig, RateLimit};
use crate::types::{BackoffType, StringMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete sync configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Name used in logs and output
    pub name: String,

    /// Where pages come from
    pub source: SourceConfig,

    /// Automatic retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

// ============================================================================
// Sources
// ============================================================================

/// Page source definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// REST endpoint with cursor pagination
    Http(HttpSourceConfig),
    /// Generated in-memory dataset
    Simulated(SimulatedSourceConfig),
}

/// REST source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Base URL for requests
    pub base_url: String,

    /// Path of the list endpoint
    pub path: String,

    /// Query parameter carrying the cursor
    #[serde(default = "default_cursor_param")]
    pub cursor_param: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Static query parameters sent with every request
    #[serde(default)]
    pub query: StringMap,

    /// Rate limit; omitted means unlimited
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,

    /// Response layout
    #[serde(default)]
    pub decode: DecodeConfig,
}

fn default_cursor_param() -> String {
    "next".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Simulated source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedSourceConfig {
    /// Size of the generated dataset
    #[serde(default = "default_total_records")]
    pub total_records: usize,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Delay before each response
    #[serde(default)]
    pub latency_ms: u64,

    /// Records repeated from the previous page
    #[serde(default)]
    pub overlap: usize,

    /// Fail every Nth call
    #[serde(default)]
    pub fail_every: Option<u32>,
}

fn default_total_records() -> usize {
    100
}

fn default_page_size() -> usize {
    10
}

impl Default for SimulatedSourceConfig {
    fn default() -> Self {
        Self {
            total_records: default_total_records(),
            page_size: default_page_size(),
            latency_ms: 0,
            overlap: 0,
            fail_every: None,
        }
    }
}

impl SimulatedSourceConfig {
    fn fetcher_config(&self) -> SimulatedConfig {
        SimulatedConfig {
            page_size: self.page_size,
            latency: Duration::from_millis(self.latency_ms),
            overlap: self.overlap,
            fail_every: self.fail_every,
        }
    }
}

// ============================================================================
// Retry
// ============================================================================

/// Retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Consecutive failures before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before a retry in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Backoff type
    #[serde(default)]
    pub backoff: BackoffType,

    /// Cap for a grown delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: BackoffType::default(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    /// Convert to the engine's retry policy
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_backoff(self.backoff, Duration::from_millis(self.max_delay_ms))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a sync configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;
    load_config_from_str(&content)
}

/// Load a sync configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<SyncConfig> {
    let config: SyncConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;

    config.validate()?;
    Ok(config)
}

impl SyncConfig {
    /// Check field values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Config name cannot be empty"));
        }

        match &self.source {
            SourceConfig::Http(http) => {
                if http.base_url.is_empty() {
                    return Err(Error::missing_field("source.base_url"));
                }
                url::Url::parse(&http.base_url)?;
                if http.path.is_empty() {
                    return Err(Error::missing_field("source.path"));
                }
                if http.cursor_param.is_empty() {
                    return Err(Error::config("source.cursor_param cannot be empty"));
                }
                if http.timeout_secs == 0 {
                    return Err(Error::config("source.timeout_secs must be positive"));
                }
            }
            SourceConfig::Simulated(sim) => {
                if sim.page_size == 0 {
                    return Err(Error::config("source.page_size must be positive"));
                }
                if sim.overlap >= sim.page_size {
                    return Err(Error::config(format!(
                        "source.overlap ({}) must be smaller than page_size ({})",
                        sim.overlap, sim.page_size
                    )));
                }
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.retry.max_delay_ms < self.retry.delay_ms {
            return Err(Error::config("retry.max_delay_ms cannot be below delay_ms"));
        }

        Ok(())
    }

    /// Engine retry policy for this config
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.to_policy()
    }

    /// Build the page fetcher for the configured source
    pub fn build_fetcher(&self) -> Result<Arc<dyn PageFetcher>> {
        match &self.source {
            SourceConfig::Http(http) => {
                let mut client_config = HttpClientConfig::default()
                    .with_base_url(http.base_url.clone())
                    .with_timeout(Duration::from_secs(http.timeout_secs));
                client_config.rate_limit.clone_from(&http.rate_limit);
                for (key, value) in &http.headers {
                    client_config = client_config.with_header(key, value);
                }

                let client = HttpClient::new(client_config)?;
                let decoder = PageDecoder::new(http.decode.clone());
                let mut fetcher =
                    HttpPageFetcher::new(client, &http.path, &http.cursor_param, decoder);
                for (key, value) in &http.query {
                    fetcher = fetcher.with_query(key, value);
                }
                Ok(Arc::new(fetcher))
            }
            SourceConfig::Simulated(sim) => Ok(Arc::new(SimulatedFetcher::people(
                sim.total_records,
                sim.fetcher_config(),
            ))),
        }
    }

    /// Short description of the source for logs
    pub fn source_label(&self) -> String {
        match &self.source {
            SourceConfig::Http(http) => format!("{}{}", http.base_url, http.path),
            SourceConfig::Simulated(sim) => format!("simulated ({} records)", sim.total_records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const HTTP_YAML: &str = r#"
name: people
source:
  type: http
  base_url: https://api.example.com
  path: /people
  headers:
    Authorization: Bearer abc
  rate_limit:
    requests_per_second: 5
    burst: 2
  decode:
    records_path: people
    name_field: fullName
retry:
  max_attempts: 4
  delay_ms: 500
  backoff: exponential
  max_delay_ms: 4000
"#;

    #[test]
    fn test_parse_http_config() {
        let config = load_config_from_str(HTTP_YAML).unwrap();
        assert_eq!(config.name, "people");

        let SourceConfig::Http(http) = &config.source else {
            panic!("expected http source");
        };
        assert_eq!(http.cursor_param, "next");
        assert_eq!(http.timeout_secs, 30);
        assert_eq!(http.headers["Authorization"], "Bearer abc");
        assert_eq!(http.rate_limit, Some(RateLimit::per_second(5).with_burst(2)));
        assert_eq!(http.decode.records_path.as_deref(), Some("people"));
        assert_eq!(http.decode.id_field, "id");
        assert_eq!(http.decode.name_field, "fullName");
        assert_eq!(config.source_label(), "https://api.example.com/people");
    }

    #[test]
    fn test_retry_config_to_policy() {
        let config = load_config_from_str(HTTP_YAML).unwrap();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_millis(500));
        assert_eq!(policy.backoff, BackoffType::Exponential);
        assert_eq!(policy.max_delay, Duration::from_secs(4));
    }

    #[test]
    fn test_defaults_for_simulated_source() {
        let config = load_config_from_str(
            r#"
name: demo
source:
  type: simulated
"#,
        )
        .unwrap();

        assert_eq!(
            config.source,
            SourceConfig::Simulated(SimulatedSourceConfig::default())
        );
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_reject_empty_name() {
        let err = load_config_from_str(
            r#"
name: ""
source:
  type: simulated
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    fn test_reject_empty_base_url() {
        let err = load_config_from_str(
            r#"
name: people
source:
  type: http
  base_url: ""
  path: /people
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "source.base_url"));
    }

    #[test]
    fn test_reject_invalid_base_url() {
        let err = load_config_from_str(
            r#"
name: people
source:
  type: http
  base_url: "not a url"
  path: /people
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_reject_zero_page_size_and_attempts() {
        let err = load_config_from_str(
            r#"
name: demo
source:
  type: simulated
  page_size: 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("page_size"));

        let err = load_config_from_str(
            r#"
name: demo
source:
  type: simulated
retry:
  max_attempts: 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_reject_unknown_source_type() {
        let err = load_config_from_str(
            r#"
name: demo
source:
  type: ftp
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HTTP_YAML.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.name, "people");
        assert!(config.build_fetcher().is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[tokio::test]
    async fn test_build_simulated_fetcher() {
        let config = load_config_from_str(
            r#"
name: demo
source:
  type: simulated
  total_records: 3
  page_size: 2
"#,
        )
        .unwrap();

        let fetcher = config.build_fetcher().unwrap();
        let page = fetcher.fetch(None).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("2"));
    }
}
