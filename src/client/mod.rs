//! Viewer-side components
//!
//! What runs inside one reader's session: merging annotation data from
//! every path it can arrive by into a single rendered set of decorations.

mod reconciler;

pub use reconciler::*;
