// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagesync
//!
//! Incremental, deduplicated loading of cursor-paginated lists.
//!
//! ## Features
//!
//! - **One engine**: cursor, accumulated records and retry state in one place
//! - **Dedup**: records are unique by id across every page
//! - **Bounded retry**: 3 attempts with a fixed 2s delay by default
//! - **Events**: data, empty-state, error, retry and give-up notifications
//! - **Sources**: REST/JSON endpoints, a simulated source, scripted test doubles
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagesync::engine::{EngineEvent, PaginationEngine};
//! use pagesync::fetch::{SimulatedConfig, SimulatedFetcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = PaginationEngine::with_fetcher(
//!         SimulatedFetcher::people(50, SimulatedConfig::default()),
//!     );
//!     let mut events = engine.subscribe().await;
//!
//!     engine.fetch_next().await;
//!     while let Some(event) = events.next_event().await {
//!         if let EngineEvent::DataChanged(items) = &event {
//!             println!("{} records", items.len());
//!         }
//!         if event.ends_cycle() {
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                  ListPresenter  →  ListView                   │
//! │   load()  refresh()  will_display(row)  handle_event(event)   │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ Subscription<EngineEvent>
//! ┌───────────────────────────────┴───────────────────────────────┐
//! │                       PaginationEngine                        │
//! │   fetch_next()   refresh()   on_near_end_of_list(index)       │
//! │   dedup · end-of-list · retry timer · generation counter      │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ PageFetcher::fetch(cursor)
//! ┌─────────────────┬─────────────┴───────────┬───────────────────┐
//! │ HttpPageFetcher │    SimulatedFetcher     │  ScriptedFetcher  │
//! │ HTTP + Decode   │    generated people     │  queued outcomes  │
//! └─────────────────┴─────────────────────────┴───────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pagination engine
pub mod engine;

/// Page fetchers
pub mod fetch;

/// HTTP client with rate limiting
pub mod http;

/// Response decoding
pub mod decode;

/// Presentation adapter
pub mod presenter;

/// Sync configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FetchError, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, SyncConfig};
pub use engine::{EngineEvent, PaginationEngine, RetryPolicy, Subscription};
pub use fetch::PageFetcher;
pub use presenter::{ListPresenter, ListView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
