//! Stored document HTML
//!
//! The rendered markup of each paper, sanitized at ingest. This is the
//! substrate anchors resolve against; metadata search and recommendations
//! live elsewhere.

mod store;

pub use store::*;
