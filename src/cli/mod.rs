//! CLI module
//!
//! Command-line interface for syncing paginated sources.
//!
//! # Commands
//!
//! - `sync` - Drain a configured source to JSON lines
//! - `demo` - Scroll through a simulated list in the terminal
//! - `validate` - Check a sync configuration

mod commands;
mod console;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use console::ConsoleView;
pub use runner::{run_demo, run_sync, DemoSettings, Runner, SyncSummary};
