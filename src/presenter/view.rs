//! View seam driven by the presenter

use crate::types::Record;

/// Text shown while the list is empty
pub const EMPTY_PLACEHOLDER: &str = "No one here :)";

/// A list surface the presenter can drive
///
/// Implementations only render; every decision about what to show is made by
/// [`ListPresenter`](super::ListPresenter).
pub trait ListView {
    /// Redraw every row
    fn reload(&mut self, rows: &[Record]);

    /// Show or hide the empty-list placeholder
    fn set_empty_placeholder_visible(&mut self, visible: bool);

    /// Show a transient notice
    fn show_notice(&mut self, message: &str);

    /// Start or stop the refresh spinner
    fn set_refreshing(&mut self, refreshing: bool);
}

impl<V: ListView + ?Sized> ListView for Box<V> {
    fn reload(&mut self, rows: &[Record]) {
        (**self).reload(rows);
    }

    fn set_empty_placeholder_visible(&mut self, visible: bool) {
        (**self).set_empty_placeholder_visible(visible);
    }

    fn show_notice(&mut self, message: &str) {
        (**self).show_notice(message);
    }

    fn set_refreshing(&mut self, refreshing: bool) {
        (**self).set_refreshing(refreshing);
    }
}
