//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::console::ConsoleView;
use crate::config::{load_config, SyncConfig};
use crate::engine::{EngineEvent, PaginationEngine, RetryPolicy};
use crate::error::{Error, Result};
use crate::fetch::{SimulatedConfig, SimulatedFetcher};
use crate::presenter::{ListPresenter, ListView};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Settings for `pagesync demo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    /// Size of the generated dataset
    pub records: usize,
    /// Simulated source behaviour
    pub source: SimulatedConfig,
    /// Delay before a retry
    pub retry_delay: Duration,
}

/// Outcome of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Records written
    pub records: usize,
    /// Pages merged
    pub pages: usize,
    /// Whether the last page was reached
    pub finished: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Sync { config, max_pages } => self.sync(config, *max_pages).await,
            Commands::Demo {
                records,
                page_size,
                overlap,
                fail_every,
                latency_ms,
                retry_delay_ms,
            } => {
                let settings = DemoSettings {
                    records: *records,
                    source: SimulatedConfig {
                        page_size: (*page_size).max(1),
                        latency: Duration::from_millis(*latency_ms),
                        overlap: *overlap,
                        fail_every: *fail_every,
                    },
                    retry_delay: Duration::from_millis(*retry_delay_ms),
                };
                run_demo(&settings, ConsoleView::stdout()).await.map(|_| ())
            }
            Commands::Validate { config } => self.validate(config),
        }
    }

    /// Drain a configured source to stdout
    async fn sync(&self, path: &Path, max_pages: Option<usize>) -> Result<()> {
        let config = load_config(path)?;
        info!("Syncing '{}' from {}", config.name, config.source_label());
        let started = Instant::now();

        let summary = run_sync(&config, max_pages, |record| {
            self.output_message(&json!({
                "type": "RECORD",
                "record": {
                    "stream": config.name,
                    "data": record,
                }
            }));
        })
        .await?;

        self.output_message(&json!({
            "type": "SUMMARY",
            "summary": {
                "stream": config.name,
                "records": summary.records,
                "pages": summary.pages,
                "finished": summary.finished,
                "duration_ms": started.elapsed().as_millis() as u64,
            }
        }));
        Ok(())
    }

    /// Validate a sync configuration
    fn validate(&self, path: &Path) -> Result<()> {
        let config = load_config(path)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Config '{}' is valid (source: {}, max attempts: {})",
                    config.name,
                    config.source_label(),
                    config.retry.max_attempts
                )
            }
        }));

        Ok(())
    }

    /// Output a JSON message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Fetch pages until the source is exhausted or `max_pages` is reached
///
/// `emit` is called once per record, in first-seen order. Returns an error if
/// the engine gives up after exhausting its retries.
pub async fn run_sync(
    config: &SyncConfig,
    max_pages: Option<usize>,
    mut emit: impl FnMut(&Value),
) -> Result<SyncSummary> {
    let engine = PaginationEngine::new(config.build_fetcher()?, config.retry_policy());
    let mut events = engine.subscribe().await;
    let mut emitted = HashSet::new();
    let mut summary = SyncSummary {
        records: 0,
        pages: 0,
        finished: false,
    };

    engine.fetch_next().await;
    while let Some(event) = events.next_event().await {
        match event {
            EngineEvent::DataChanged(items) => {
                summary.pages += 1;
                for record in items.iter().filter(|r| emitted.insert(r.id.clone())) {
                    emit(&serde_json::to_value(record)?);
                    summary.records += 1;
                }
            }
            EngineEvent::EmptyStateChanged(_) => {
                summary.finished = engine.is_pagination_finished().await;
                let limit_reached = max_pages.is_some_and(|max| summary.pages >= max);
                if summary.finished || limit_reached {
                    break;
                }
                engine.fetch_next().await;
            }
            EngineEvent::Error(message) => info!("{message}"),
            EngineEvent::RetryScheduled => debug!("Retry scheduled"),
            EngineEvent::FetchEnded => {
                engine.close().await;
                return Err(Error::Other(format!(
                    "Sync '{}' stopped after {} pages: retries exhausted",
                    config.name, summary.pages
                )));
            }
        }
    }

    engine.close().await;
    info!(
        records = summary.records,
        pages = summary.pages,
        "Sync of '{}' complete",
        config.name
    );
    Ok(summary)
}

/// Scroll through a simulated list, row by row, until it ends
///
/// Rows are "displayed" in order; the presenter requests the next page when
/// the prefetch row comes into view. Returns the view once the last page is
/// shown or retries are exhausted.
pub async fn run_demo<V: ListView>(
    settings: &DemoSettings,
    view: V,
) -> Result<V> {
    let fetcher = SimulatedFetcher::people(settings.records, settings.source.clone());
    let policy = RetryPolicy::new().with_delay(settings.retry_delay);
    let engine = PaginationEngine::new(Arc::new(fetcher), policy);
    let mut presenter = ListPresenter::new(engine, view).await;

    presenter.load().await;
    let mut displayed = 0;
    while let Some(event) = presenter.next_event().await {
        match event {
            EngineEvent::FetchEnded => break,
            EngineEvent::EmptyStateChanged(_) => {}
            _ => continue,
        }
        if presenter.engine().is_pagination_finished().await {
            break;
        }

        let mut requested = false;
        while !requested && displayed < presenter.number_of_rows() {
            requested = presenter.will_display(displayed).await;
            displayed += 1;
        }
        // short lists never reach the prefetch row
        if !requested {
            presenter.load().await;
        }
    }

    info!(rows = presenter.number_of_rows(), "Demo finished");
    Ok(presenter.into_view().await)
}
