//! Marginalia Server Library
//!
//! Annotation anchoring and live multi-reader sync for a paper reading
//! platform. The main server binary is in main.rs.
//!
//! # Modules
//!
//! - `anchor`: content-addressed text-range descriptors (encode/resolve)
//! - `markup`: source-span document views, decoration painting, sanitization
//! - `annotations`: annotation and highlight records plus persistence
//! - `documents`: stored document HTML
//! - `sync`: per-document broadcast hub and wire protocol
//! - `client`: viewer-side reconciliation of decorations
//! - `routes`: HTTP and WebSocket API

pub mod anchor;
pub mod annotations;
pub mod client;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod markup;
pub mod routes;
pub mod state;
pub mod sync;
