//! HTTP client module
//!
//! Transport used by [`HttpPageFetcher`](crate::fetch::HttpPageFetcher).
//!
//! # Features
//!
//! - **Throttling**: governor token bucket shared by clones
//! - **Timeouts**: client-wide default, overridable per request
//! - **Status mapping**: non-2xx responses become `Error::HttpStatus`

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestOptions};
pub use rate_limit::{RateLimit, Throttle};
