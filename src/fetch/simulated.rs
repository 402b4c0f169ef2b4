//! Simulated data source
//!
//! Stands in for a real backend during demos and tests. Pages overlap by a
//! configurable number of records, and failures can be injected on a fixed
//! schedule, so every engine path can be exercised without a network.

use super::types::{FetchResult, PageFetcher};
use crate::error::FetchError;
use crate::types::{Page, Record};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Description of an injected failure
pub const SIMULATED_FAILURE: &str = "The operation couldn't be completed (simulated outage)";

const FIRST_NAMES: &[&str] = &[
    "Ann", "Bob", "Cid", "Dee", "Eli", "Fay", "Gus", "Hal", "Ida", "Jon", "Kim", "Lou",
];
const LAST_NAMES: &[&str] = &["Lee", "Stone", "Moss", "Park", "Reed", "Shaw", "Vale"];

/// Simulated source settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedConfig {
    /// Records per page (at least 1)
    pub page_size: usize,
    /// Delay before each response
    pub latency: Duration,
    /// Records from the previous page repeated at the start of the next one
    pub overlap: usize,
    /// Fail every Nth call (1-based); `None` never fails
    pub fail_every: Option<u32>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            latency: Duration::ZERO,
            overlap: 0,
            fail_every: None,
        }
    }
}

/// In-memory page source
#[derive(Debug)]
pub struct SimulatedFetcher {
    records: Vec<Record>,
    config: SimulatedConfig,
    calls: AtomicU32,
}

impl SimulatedFetcher {
    /// Serve `records` in pages
    pub fn new(records: Vec<Record>, config: SimulatedConfig) -> Self {
        Self {
            records,
            config,
            calls: AtomicU32::new(0),
        }
    }

    /// Serve `total` generated people
    pub fn people(total: usize, config: SimulatedConfig) -> Self {
        Self::new(generate_people(total), config)
    }

    /// Number of fetch calls so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Full dataset
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn page_at(&self, offset: usize) -> Page {
        let len = self.records.len();
        let start = offset.saturating_sub(self.config.overlap);
        let end = offset.saturating_add(self.config.page_size.max(1)).min(len);
        let next_cursor = (end < len).then(|| end.to_string());
        Page::new(self.records[start..end].to_vec(), next_cursor)
    }
}

#[async_trait]
impl PageFetcher for SimulatedFetcher {
    async fn fetch(&self, cursor: Option<String>) -> FetchResult {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if let Some(every) = self.config.fail_every.filter(|n| *n > 0) {
            if call % every == 0 {
                return Err(FetchError::new(SIMULATED_FAILURE));
            }
        }

        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .ok()
                .filter(|offset| *offset <= self.records.len())
                .ok_or_else(|| FetchError::new("Parameter error"))?,
        };

        Ok(self.page_at(offset))
    }
}

/// Generate `total` people with ids `1..=total`
pub(crate) fn generate_people(total: usize) -> Vec<Record> {
    (0..total)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()];
            Record::new((i + 1).to_string(), format!("{first} {last}"))
        })
        .collect()
}
