//! Request throttling
//!
//! A fast scroll can ask for pages back to back. [`Throttle`] holds each
//! request until the configured [`RateLimit`] admits it.

use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Requests admitted per second, plus how many may go out at once
///
/// ```yaml
/// rate_limit:
///   requests_per_second: 5
///   burst: 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests_per_second: u32,
    #[serde(default = "one", alias = "burst_size")]
    pub burst: u32,
}

fn one() -> u32 {
    1
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_second(10).with_burst(10)
    }
}

impl RateLimit {
    /// `requests_per_second` with no burst allowance
    pub fn per_second(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            burst: 1,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// Governor quota; zero values count as one
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket; clones draw from the same bucket
#[derive(Clone)]
pub struct Throttle {
    bucket: Arc<DefaultDirectRateLimiter>,
}

impl Throttle {
    pub fn new(limit: &RateLimit) -> Self {
        Self {
            bucket: Arc::new(DefaultDirectRateLimiter::direct(limit.quota())),
        }
    }

    /// Wait for a token
    pub async fn acquire(&self) {
        self.bucket.until_ready().await;
    }

    /// Take a token if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.bucket.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish_non_exhaustive()
    }
}
