//! Presentation adapter
//!
//! Connects a [`PaginationEngine`] to a [`ListView`]. The presenter owns the
//! engine, so the engine lives exactly as long as the screen it feeds, and it
//! owns one subscription that it pumps on the caller's task.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut presenter = ListPresenter::new(engine, view).await;
//! presenter.load().await;
//! while let Some(event) = presenter.next_event().await {
//!     if event.ends_cycle() {
//!         break;
//!     }
//! }
//! ```

mod view;

pub use view::{ListView, EMPTY_PLACEHOLDER};

use crate::engine::{EngineEvent, PaginationEngine, Subscription};
use crate::types::Record;
use tracing::debug;

/// Drives a [`ListView`] from engine events
pub struct ListPresenter<V> {
    engine: PaginationEngine,
    events: Subscription,
    view: V,
    rows: Vec<Record>,
}

impl<V: ListView> ListPresenter<V> {
    /// Take ownership of `engine` and subscribe to it
    pub async fn new(engine: PaginationEngine, view: V) -> Self {
        let events = engine.subscribe().await;
        Self {
            engine,
            events,
            view,
            rows: Vec::new(),
        }
    }

    /// Initial load
    pub async fn load(&self) -> bool {
        self.engine.fetch_next().await
    }

    /// Pull-to-refresh
    ///
    /// Does nothing once the engine is closed; no event would stop the spinner.
    pub async fn refresh(&mut self) {
        if self.engine.is_closed() {
            debug!("Refresh ignored, engine closed");
            return;
        }
        self.view.set_refreshing(true);
        self.engine.refresh().await;
    }

    /// A row is about to be displayed
    pub async fn will_display(&self, row: usize) -> bool {
        self.engine.on_near_end_of_list(row).await
    }

    /// Number of rows currently shown
    pub fn number_of_rows(&self) -> usize {
        self.rows.len()
    }

    /// Record shown at `row`
    pub fn record_at(&self, row: usize) -> Option<&Record> {
        self.rows.get(row)
    }

    /// Rows currently shown
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Apply one engine event to the view
    pub fn handle_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::DataChanged(records) => {
                self.rows.clone_from(records);
                self.view.reload(&self.rows);
                self.view.set_refreshing(false);
            }
            EngineEvent::EmptyStateChanged(empty) => {
                self.view.set_empty_placeholder_visible(*empty);
            }
            EngineEvent::Error(message) => self.view.show_notice(message),
            EngineEvent::RetryScheduled => debug!("Retry scheduled, keeping spinner"),
            EngineEvent::FetchEnded => self.view.set_refreshing(false),
        }
    }

    /// Wait for the next event, apply it and return it
    ///
    /// Returns `None` once the engine is closed.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let event = self.events.next_event().await?;
        self.handle_event(&event);
        Some(event)
    }

    /// Apply every event already queued; returns how many were applied
    pub fn drain_pending(&mut self) -> usize {
        let events = self.events.drain();
        for event in &events {
            self.handle_event(event);
        }
        events.len()
    }

    /// The engine behind this presenter
    pub fn engine(&self) -> &PaginationEngine {
        &self.engine
    }

    /// The driven view
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the driven view
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Close the engine and hand back the view
    pub async fn into_view(self) -> V {
        self.engine.close().await;
        self.view
    }
}

impl<V> std::fmt::Debug for ListPresenter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListPresenter")
            .field("engine", &self.engine)
            .field("rows", &self.rows.len())
            .finish_non_exhaustive()
    }
}
