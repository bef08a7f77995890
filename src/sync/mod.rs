//! Live synchronization
//!
//! A per-document broadcast layer: viewers of the same document join its
//! channel and see each other's newly created annotations without
//! refetching. Delivery is best-effort and at-most-once; the store remains
//! the source of truth and a full fetch on open catches up anything a
//! client missed while away.

mod hub;
mod types;

pub use hub::*;
pub use types::*;
