//! Engine state and its transitions
//!
//! Everything here is synchronous and side-effect free apart from the state
//! itself. The engine calls these transitions while holding its lock and
//! forwards the returned events to subscribers.

use super::types::{EngineEvent, EngineSnapshot, RetryPolicy, PREFETCH_THRESHOLD};
use crate::error::FetchError;
use crate::types::{Page, Record};
use std::collections::HashSet;
use std::time::Duration;

/// What to do after a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Schedule another attempt
    Retry {
        /// Failure number within the current cycle (1-based)
        attempt: u32,
        /// How long to wait before the retry
        delay: Duration,
        /// Events to emit
        events: Vec<EngineEvent>,
    },
    /// Stop retrying
    Exhausted {
        /// Events to emit
        events: Vec<EngineEvent>,
    },
}

impl FailureOutcome {
    /// Events to emit for this outcome
    pub fn events(&self) -> &[EngineEvent] {
        match self {
            Self::Retry { events, .. } | Self::Exhausted { events } => events,
        }
    }
}

/// Pagination state owned by one engine
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    items: Vec<Record>,
    ids: HashSet<String>,
    cursor: Option<String>,
    is_pagination_finished: bool,
    retry_count: u32,
    fetch_in_flight: bool,
}

impl EngineState {
    /// Create the initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated records
    pub fn items(&self) -> &[Record] {
        &self.items
    }

    /// Cursor for the next request
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Whether the last page has been merged
    pub fn is_pagination_finished(&self) -> bool {
        self.is_pagination_finished
    }

    /// Consecutive failures
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Whether a fetch call is outstanding
    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Mark a fetch as started and return the cursor to request
    ///
    /// A cycle that already exhausted its retries starts over from zero.
    pub fn begin_fetch(&mut self, policy: &RetryPolicy) -> Option<String> {
        if self.retry_count >= policy.max_attempts {
            self.retry_count = 0;
        }
        self.fetch_in_flight = true;
        self.cursor.clone()
    }

    /// Forget an outstanding fetch without applying its result
    pub fn abandon_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    /// Merge a fetched page
    pub fn apply_page(&mut self, page: Page) -> Vec<EngineEvent> {
        self.retry_count = 0;

        // A first page supersedes what is on screen. Keyed on the cursor,
        // never on the incoming page.
        if self.cursor.is_none() && !self.items.is_empty() {
            self.clear_items();
        }

        if !page.records.is_empty() {
            for record in page.records {
                if self.ids.insert(record.id.clone()) {
                    self.items.push(record);
                }
            }
        } else if !self.items.is_empty() {
            self.clear_items();
        }

        self.cursor = page.next_cursor;
        if self.cursor.is_none() {
            self.is_pagination_finished = true;
        }
        self.fetch_in_flight = false;

        vec![
            EngineEvent::DataChanged(self.items.clone()),
            EngineEvent::EmptyStateChanged(self.items.is_empty()),
        ]
    }

    /// Record a failed fetch
    pub fn record_failure(&mut self, error: &FetchError, policy: &RetryPolicy) -> FailureOutcome {
        self.retry_count += 1;
        self.fetch_in_flight = false;

        if self.retry_count < policy.max_attempts {
            let attempt = self.retry_count;
            FailureOutcome::Retry {
                attempt,
                delay: policy.delay_for(attempt),
                events: vec![
                    EngineEvent::Error(policy.retry_message(error.description(), attempt)),
                    EngineEvent::RetryScheduled,
                ],
            }
        } else {
            FailureOutcome::Exhausted {
                events: vec![
                    EngineEvent::Error(policy.exhausted_message()),
                    EngineEvent::FetchEnded,
                ],
            }
        }
    }

    /// Rewind to the first page; items stay until a first page arrives
    pub fn reset_for_refresh(&mut self) {
        self.is_pagination_finished = false;
        self.cursor = None;
        self.retry_count = 0;
    }

    /// Whether displaying row `visible_index` should request the next page
    pub fn should_prefetch(&self, visible_index: usize) -> bool {
        !self.is_pagination_finished
            && self.items.len() >= PREFETCH_THRESHOLD
            && visible_index == self.items.len() - PREFETCH_THRESHOLD
    }

    /// Copy out the observable state
    pub fn snapshot(&self, retry_pending: bool) -> EngineSnapshot {
        EngineSnapshot {
            items: self.items.clone(),
            cursor: self.cursor.clone(),
            is_pagination_finished: self.is_pagination_finished,
            retry_count: self.retry_count,
            fetch_in_flight: self.fetch_in_flight || retry_pending,
        }
    }

    fn clear_items(&mut self) {
        self.items.clear();
        self.ids.clear();
    }
}
