//! HTTP page fetcher

use super::types::{FetchResult, PageFetcher};
use crate::decode::PageDecoder;
use crate::error::{FetchError, Result};
use crate::http::{HttpClient, RequestOptions};
use crate::types::Page;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Fetches pages from a REST endpoint
///
/// The first page is requested without the cursor parameter; later pages
/// send the previous page's cursor as `?{cursor_param}={cursor}`.
#[derive(Debug)]
pub struct HttpPageFetcher {
    client: HttpClient,
    path: String,
    cursor_param: String,
    query: HashMap<String, String>,
    decoder: PageDecoder,
}

impl HttpPageFetcher {
    /// Create a fetcher for `path` on the client's base URL
    pub fn new(
        client: HttpClient,
        path: impl Into<String>,
        cursor_param: impl Into<String>,
        decoder: PageDecoder,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            cursor_param: cursor_param.into(),
            query: HashMap::new(),
            decoder,
        }
    }

    /// Add a query parameter sent with every request
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Fetch and decode one page
    pub async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page> {
        let mut request = RequestOptions::new();
        for (key, value) in &self.query {
            request = request.query(key, value);
        }
        if let Some(cursor) = cursor {
            request = request.query(&self.cursor_param, cursor);
        }

        let body = self.client.get_text(&self.path, request).await?;
        let page = self.decoder.decode(&body)?;
        debug!(
            "Fetched {} records from {} (next: {:?})",
            page.records.len(),
            self.path,
            page.next_cursor
        );
        Ok(page)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, cursor: Option<String>) -> FetchResult {
        self.fetch_page(cursor.as_deref())
            .await
            .map_err(FetchError::from)
    }
}
