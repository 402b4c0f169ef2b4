//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated list synchronization
#[derive(Parser, Debug)]
#[command(name = "pagesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drain a configured source and print every record
    Sync {
        /// Sync configuration file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Scroll through a simulated list in the terminal
    Demo {
        /// Size of the generated dataset
        #[arg(long, default_value = "40")]
        records: usize,

        /// Records per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Records repeated from the previous page
        #[arg(long, default_value = "0")]
        overlap: usize,

        /// Fail every Nth request
        #[arg(long)]
        fail_every: Option<u32>,

        /// Delay before each response in milliseconds
        #[arg(long, default_value = "200")]
        latency_ms: u64,

        /// Delay before a retry in milliseconds
        #[arg(long, default_value = "2000")]
        retry_delay_ms: u64,
    },

    /// Validate a sync configuration
    Validate {
        /// Sync configuration file (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
