//! Engine types
//!
//! Events, retry policy and read-only snapshots for the pagination engine.

use crate::types::{BackoffType, Record};
use std::time::Duration;

/// Rows from the end of the list at which the next page is requested
pub const PREFETCH_THRESHOLD: usize = 3;

/// A change notification emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The accumulated list changed; carries the full current list
    DataChanged(Vec<Record>),
    /// Whether the list is now empty
    EmptyStateChanged(bool),
    /// A transient, user-facing notice
    Error(String),
    /// A failed fetch will be retried after the policy delay
    RetryScheduled,
    /// Retries are exhausted; nothing further will happen automatically
    FetchEnded,
}

impl EngineEvent {
    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Check if this is a data event
    pub fn is_data(&self) -> bool {
        matches!(self, Self::DataChanged(_))
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Check if this event closes a fetch cycle
    ///
    /// A cycle ends either with new data or with exhausted retries.
    pub fn ends_cycle(&self) -> bool {
        matches!(self, Self::EmptyStateChanged(_) | Self::FetchEnded)
    }
}

/// Automatic retry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failures after which retrying stops
    pub max_attempts: u32,
    /// Base delay before a retry
    pub delay: Duration,
    /// How the delay grows between attempts
    pub backoff: BackoffType,
    /// Upper bound for a grown delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            backoff: BackoffType::Constant,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create the default policy (3 attempts, fixed 2s delay)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attempt limit
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set backoff configuration
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, max_delay: Duration) -> Self {
        self.backoff = backoff;
        self.max_delay = max_delay;
        self
    }

    /// Delay before the retry that follows failure number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let step = attempt.saturating_sub(1);
        let delay = match self.backoff {
            BackoffType::Constant => return self.delay,
            BackoffType::Linear => self.delay.saturating_mul(step + 1),
            BackoffType::Exponential => self.delay.saturating_mul(2u32.saturating_pow(step)),
        };

        std::cmp::min(delay, self.max_delay)
    }

    /// Notice for a failure that will be retried
    pub fn retry_message(&self, description: &str, attempt: u32) -> String {
        format!(
            "Error occurred: {description}. Retrying... ({attempt}/{})",
            self.max_attempts
        )
    }

    /// Notice for the failure that exhausts the policy
    pub fn exhausted_message(&self) -> String {
        format!(
            "Error occurred after {} attempts. Please try again later.",
            self.max_attempts
        )
    }
}

/// Read-only copy of the engine state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Accumulated records, unique by id
    pub items: Vec<Record>,
    /// Cursor for the next request
    pub cursor: Option<String>,
    /// Whether the last page has been merged
    pub is_pagination_finished: bool,
    /// Consecutive failures so far
    pub retry_count: u32,
    /// Whether a fetch is outstanding or a retry is pending
    pub fetch_in_flight: bool,
}

impl EngineSnapshot {
    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of the accumulated records, in order
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|r| r.id.as_str()).collect()
    }
}
