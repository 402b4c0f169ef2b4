//! Response decoder module
//!
//! Turns a JSON response body into a [`Page`](crate::types::Page).
//!
//! # Overview
//!
//! A [`PageDecoder`] is configured with four paths into the body: the record
//! array, the id and display name inside each record, and the next cursor.
//! Paths use dot notation (`data.items`, `$.meta.next`) with array indexing
//! (`results[0]`); record paths containing `*` go through jsonpath-rust.

mod page;
mod types;

pub use page::{extract_path, PageDecoder};
pub use types::DecodeConfig;
