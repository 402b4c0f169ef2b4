//! Pagination engine module
//!
//! Incremental, deduplicated list loading on top of a [`PageFetcher`].
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationEngine` - Owns cursor, records and retry state; runs fetches
//! - `EngineEvent` - Change notifications for the presentation layer
//! - `RetryPolicy` - Attempt limit and delay for automatic retries
//! - `Subscription` - Event stream for one listener
//!
//! # Concurrency
//!
//! All state lives behind one async mutex. Fetches and retry timers run as
//! spawned tasks that only hold a weak reference to the engine and re-take the
//! lock to apply their result, so at most one fetch/retry cycle is ever in
//! progress and events reach subscribers in the order the state changed.
//! `refresh()` and `close()` bump a generation counter; results and timers
//! from an older generation are dropped on arrival.
//!
//! Operations spawn onto the current tokio runtime and must be called from
//! within one.

mod events;
mod state;
mod types;

pub use events::Subscription;
pub use state::{EngineState, FailureOutcome};
pub use types::{EngineEvent, EngineSnapshot, RetryPolicy, PREFETCH_THRESHOLD};

use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::types::{Page, Record};
use events::EventHub;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Paginated list synchronization engine
pub struct PaginationEngine {
    shared: Arc<Shared>,
}

struct Shared {
    fetcher: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
    /// Cleared on close or drop; late completions check it before touching state
    alive: AtomicBool,
    inner: Mutex<Inner>,
}

struct Inner {
    state: EngineState,
    hub: EventHub,
    generation: u64,
    fetch_task: Option<JoinHandle<()>>,
    retry_timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn is_busy(&self) -> bool {
        self.state.fetch_in_flight() || self.retry_timer.is_some()
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
        self.state.abandon_fetch();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl PaginationEngine {
    /// Create a new engine in the initial state
    pub fn new(fetcher: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                fetcher,
                policy,
                alive: AtomicBool::new(true),
                inner: Mutex::new(Inner {
                    state: EngineState::new(),
                    hub: EventHub::new(),
                    generation: 0,
                    fetch_task: None,
                    retry_timer: None,
                }),
            }),
        }
    }

    /// Create an engine with the default retry policy
    pub fn with_fetcher(fetcher: impl PageFetcher + 'static) -> Self {
        Self::new(Arc::new(fetcher), RetryPolicy::default())
    }

    /// Retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.shared.policy
    }

    /// Register a listener
    pub async fn subscribe(&self) -> Subscription {
        self.shared.inner.lock().await.hub.subscribe()
    }

    /// Number of live subscriptions
    pub async fn subscriber_count(&self) -> usize {
        self.shared.inner.lock().await.hub.subscriber_count()
    }

    /// Request the page at the current cursor
    ///
    /// Does nothing while a fetch is outstanding or a retry is pending.
    /// Returns whether a fetch was started.
    pub async fn fetch_next(&self) -> bool {
        let mut inner = self.shared.inner.lock().await;
        self.shared.start_fetch(&mut inner)
    }

    /// Start over from the first page
    ///
    /// Cancels any pending retry and outstanding fetch. Records already on
    /// screen stay until the new first page arrives.
    pub async fn refresh(&self) {
        let mut inner = self.shared.inner.lock().await;
        if !self.shared.is_alive() {
            return;
        }
        inner.cancel_pending();
        inner.generation += 1;
        inner.state.reset_for_refresh();
        info!(generation = inner.generation, "Refreshing from first page");
        self.shared.start_fetch(&mut inner);
    }

    /// Notify the engine that row `visible_index` is being displayed
    ///
    /// Requests the next page when the row is [`PREFETCH_THRESHOLD`] rows from
    /// the end. Returns whether a fetch was started.
    pub async fn on_near_end_of_list(&self, visible_index: usize) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if !inner.state.should_prefetch(visible_index) {
            return false;
        }
        debug!(visible_index, "Prefetch threshold reached");
        self.shared.start_fetch(&mut inner)
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> EngineSnapshot {
        let inner = self.shared.inner.lock().await;
        inner.state.snapshot(inner.retry_timer.is_some())
    }

    /// Current records
    pub async fn items(&self) -> Vec<Record> {
        self.shared.inner.lock().await.state.items().to_vec()
    }

    /// Whether the last page has been merged
    pub async fn is_pagination_finished(&self) -> bool {
        self.shared
            .inner
            .lock()
            .await
            .state
            .is_pagination_finished()
    }

    /// Whether a fetch is outstanding or a retry is pending
    pub async fn is_busy(&self) -> bool {
        self.shared.inner.lock().await.is_busy()
    }

    /// Tear the engine down
    ///
    /// Cancels the retry timer and outstanding fetch, ends all subscriptions
    /// and turns every later call into a no-op.
    pub async fn close(&self) {
        self.shared.alive.store(false, Ordering::Release);
        let mut inner = self.shared.inner.lock().await;
        inner.generation += 1;
        inner.cancel_pending();
        inner.hub.close();
        debug!("Engine closed");
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        !self.shared.is_alive()
    }
}

impl Drop for PaginationEngine {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        // A completion holding the lock finishes first; its Arc is the last one
        // and dropping `Inner` then aborts whatever it armed.
        if let Ok(mut inner) = self.shared.inner.try_lock() {
            inner.cancel_pending();
            inner.hub.close();
        }
    }
}

impl std::fmt::Debug for PaginationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationEngine")
            .field("policy", &self.shared.policy)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn start_fetch(self: &Arc<Self>, inner: &mut Inner) -> bool {
        if !self.is_alive() {
            return false;
        }
        if inner.is_busy() {
            debug!("Fetch already in flight, ignoring request");
            return false;
        }

        let cursor = inner.state.begin_fetch(&self.policy);
        let generation = inner.generation;
        debug!(cursor = ?cursor, generation, "Fetching page");

        let fetcher = Arc::clone(&self.fetcher);
        let weak = Arc::downgrade(self);
        inner.fetch_task = Some(tokio::spawn(async move {
            let result = fetcher.fetch(cursor).await;
            if let Some(shared) = weak.upgrade() {
                shared.complete(generation, result).await;
            }
        }));
        true
    }

    async fn complete(
        self: &Arc<Self>,
        generation: u64,
        result: std::result::Result<Page, FetchError>,
    ) {
        let mut inner = self.inner.lock().await;
        if !self.is_alive() || inner.generation != generation {
            debug!(generation, "Discarding superseded fetch result");
            return;
        }
        inner.fetch_task = None;

        match result {
            Ok(page) => {
                let received = page.records.len();
                let events = inner.state.apply_page(page);
                let total = inner.state.items().len();
                debug!(received, total, "Page merged");
                if inner.state.is_pagination_finished() {
                    info!(total, "Reached last page");
                }
                inner.hub.emit_all(&events);
            }
            Err(error) => {
                let outcome = inner.state.record_failure(&error, &self.policy);
                inner.hub.emit_all(outcome.events());
                match outcome {
                    FailureOutcome::Retry { attempt, delay, .. } => {
                        warn!(
                            "Fetch failed: {error}, attempt {attempt}/{}, retrying in {delay:?}",
                            self.policy.max_attempts
                        );
                        self.arm_retry(&mut inner, delay);
                    }
                    FailureOutcome::Exhausted { .. } => {
                        warn!(
                            "Fetch failed: {error}, giving up after {} attempts",
                            self.policy.max_attempts
                        );
                    }
                }
            }
        }
    }

    fn arm_retry(self: &Arc<Self>, inner: &mut Inner, delay: Duration) {
        let generation = inner.generation;
        let weak = Arc::downgrade(self);
        inner.retry_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.fire_retry(generation).await;
            }
        }));
    }

    async fn fire_retry(self: &Arc<Self>, generation: u64) {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            return;
        }
        inner.retry_timer = None;
        debug!("Retry timer elapsed");
        self.start_fetch(&mut inner);
    }
}

#[cfg(test)]
mod tests;
