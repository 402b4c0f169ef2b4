//! GET-only client used to pull pages
//!
//! Relative paths are joined onto the configured base URL, and every request
//! waits on the [`Throttle`] when one is configured. A non-2xx answer comes
//! back as [`Error::HttpStatus`] and an elapsed deadline as
//! [`Error::Timeout`]. Nothing is retried here; the engine owns retries.

use super::rate_limit::{RateLimit, Throttle};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Settings shared by every request of one client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: Option<String>,
    /// Deadline unless a request sets its own
    pub timeout: Duration,
    /// `None` sends requests unthrottled
    pub rate_limit: Option<RateLimit>,
    pub default_headers: HashMap<String, String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimit::default()),
            default_headers: HashMap::new(),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    /// Header sent with every request
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// Extras for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct HttpClient {
    inner: Client,
    config: HttpClientConfig,
    throttle: Option<Throttle>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let inner = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let throttle = config.rate_limit.as_ref().map(Throttle::new);

        Ok(Self {
            inner,
            config,
            throttle,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn is_throttled(&self) -> bool {
        self.throttle.is_some()
    }

    /// Send a GET and fail on any non-2xx status
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response> {
        let url = self.url_for(path);
        let deadline = options.timeout.unwrap_or(self.config.timeout);

        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let response = self
            .prepare(&url, &options)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        timeout_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                    }
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("GET {url} answered {status}");
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("GET {url} ok");
        Ok(response)
    }

    /// [`get`](Self::get), returning the body
    pub async fn get_text(&self, path: &str, options: RequestOptions) -> Result<String> {
        self.get(path, options)
            .await?
            .text()
            .await
            .map_err(|e| Error::decode(format!("Failed to read response body: {e}")))
    }

    /// Absolute URLs pass through untouched
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    fn prepare(&self, url: &str, options: &RequestOptions) -> RequestBuilder {
        let headers = self.config.default_headers.iter().chain(&options.headers);
        let request = headers.fold(self.inner.get(url), |req, (key, value)| {
            req.header(key.as_str(), value.as_str())
        });
        if options.query.is_empty() {
            request
        } else {
            request.query(&options.query)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("throttled", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}
