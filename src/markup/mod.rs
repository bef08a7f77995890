//! Markup handling
//!
//! Source-span document views, decoration painting, and sanitization of
//! ingested document HTML.

mod decorator;
mod sanitize;
mod scan;

pub use decorator::*;
pub use sanitize::*;
pub use scan::*;
