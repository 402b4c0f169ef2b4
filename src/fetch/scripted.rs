//! Scripted fetcher for tests

use super::types::{FetchResult, PageFetcher};
use crate::error::FetchError;
use crate::types::Page;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Step {
    outcome: FetchResult,
    delay: Option<Duration>,
}

/// Replays queued outcomes in order and records every requested cursor
///
/// Once the script runs out, every call fails with `"no scripted response"`.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedFetcher {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page
    pub fn push_page(&self, page: Page) -> &Self {
        self.push(Ok(page), None)
    }

    /// Queue a failure
    pub fn push_failure(&self, description: impl Into<String>) -> &Self {
        self.push(Err(FetchError::new(description)), None)
    }

    /// Queue a page delivered after `delay`
    pub fn push_delayed_page(&self, page: Page, delay: Duration) -> &Self {
        self.push(Ok(page), Some(delay))
    }

    /// Queue a failure delivered after `delay`
    pub fn push_delayed_failure(&self, description: impl Into<String>, delay: Duration) -> &Self {
        self.push(Err(FetchError::new(description)), Some(delay))
    }

    /// Cursors requested so far, in call order
    pub fn calls(&self) -> Vec<Option<String>> {
        lock(&self.calls).clone()
    }

    /// Number of fetch calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of queued outcomes not yet consumed
    pub fn remaining(&self) -> usize {
        lock(&self.steps).len()
    }

    fn push(&self, outcome: FetchResult, delay: Option<Duration>) -> &Self {
        lock(&self.steps).push_back(Step { outcome, delay });
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, cursor: Option<String>) -> FetchResult {
        lock(&self.calls).push(cursor);
        let step = lock(&self.steps).pop_front();

        let Some(step) = step else {
            return Err(FetchError::new("no scripted response"));
        };
        if let Some(delay) = step.delay {
            tokio::time::sleep(delay).await;
        }
        step.outcome
    }
}
