//! Terminal list view used by `pagesync demo`

use crate::presenter::{ListView, EMPTY_PLACEHOLDER};
use crate::types::Record;
use std::io::Write;
use tracing::debug;

/// Prints rows to a writer as they appear
///
/// Only rows past the last printed one are written on reload. When the list
/// shrinks or its head changes (a refresh), everything is printed again.
pub struct ConsoleView<W: Write> {
    out: W,
    shown: Vec<String>,
    refreshing: bool,
}

impl ConsoleView<std::io::Stdout> {
    /// View writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    /// View writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: Vec::new(),
            refreshing: false,
        }
    }

    /// Number of rows printed for the current list
    pub fn shown(&self) -> usize {
        self.shown.len()
    }

    /// Consume the view and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            debug!("Console write failed: {e}");
        }
    }
}

impl<W: Write> ListView for ConsoleView<W> {
    fn reload(&mut self, rows: &[Record]) {
        let continues = rows.len() >= self.shown.len()
            && self.shown.iter().zip(rows).all(|(id, row)| *id == row.id);
        if !continues {
            self.line("-- list reloaded --");
            self.shown.clear();
        }

        for (row, record) in rows.iter().enumerate().skip(self.shown.len()) {
            let text = format!("{:>4}  {}", row + 1, record.display_name);
            self.line(&text);
            self.shown.push(record.id.clone());
        }
    }

    fn set_empty_placeholder_visible(&mut self, visible: bool) {
        if visible {
            self.line(EMPTY_PLACEHOLDER);
        }
    }

    fn show_notice(&mut self, message: &str) {
        let text = format!("! {message}");
        self.line(&text);
    }

    fn set_refreshing(&mut self, refreshing: bool) {
        if refreshing && !self.refreshing {
            self.line("(refreshing...)");
        }
        self.refreshing = refreshing;
    }
}
