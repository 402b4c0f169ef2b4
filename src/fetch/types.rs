//! Fetcher trait

use crate::error::FetchError;
use crate::types::Page;
use async_trait::async_trait;

/// Outcome of one fetch
pub type FetchResult = std::result::Result<Page, FetchError>;

/// Source of pages for the pagination engine
///
/// `cursor` is `None` for the first page and otherwise the `next_cursor` of
/// the previous page, passed back verbatim.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `cursor`
    async fn fetch(&self, cursor: Option<String>) -> FetchResult;
}
