//! Page fetcher module
//!
//! The engine's only collaborator is a [`PageFetcher`]: given an optional
//! cursor it returns one [`Page`](crate::types::Page) or a
//! [`FetchError`](crate::error::FetchError). Fetchers are stateless per call
//! and never retry on their own.
//!
//! # Implementations
//!
//! - `HttpPageFetcher` - REST endpoint with a cursor query parameter
//! - `SimulatedFetcher` - In-memory people list with latency, overlapping
//!   pages and injected failures
//! - `ScriptedFetcher` - Queue of canned outcomes with a call log

mod http;
mod scripted;
mod simulated;
mod types;

pub use http::HttpPageFetcher;
pub use scripted::ScriptedFetcher;
pub use simulated::{SimulatedConfig, SimulatedFetcher, SIMULATED_FAILURE};
pub use types::{FetchResult, PageFetcher};
