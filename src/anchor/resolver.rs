//! Anchor resolution
//!
//! Relocates a descriptor inside the current document view: collect
//! elements by tag, keep those whose serialized markup equals the
//! snapshot, then scan the winner's child text nodes for exact content
//! equality. Every tie breaks to the first candidate in document order.
//! Resolution is a pure function of (markup, descriptor); failure is an
//! expected outcome — a document that has not finished rendering, or whose
//! text has changed — never an error.

use std::ops::Range;

use crate::markup::{DocumentView, ElementId, TextNodeId};

use super::types::AnchorDescriptor;

/// A descriptor relocated against one document view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchor {
    pub container: ElementId,
    pub text_node: TextNodeId,
    /// Character offsets within the text node, as in the descriptor
    pub start_offset: usize,
    pub end_offset: usize,
    /// Absolute byte range of the anchored text in the document markup
    pub byte_range: Range<usize>,
}

/// Relocate `anchor` in `view`. `None` means "not renderable here and
/// now" — the caller skips the record and moves on.
pub fn resolve(view: &DocumentView, anchor: &AnchorDescriptor) -> Option<ResolvedAnchor> {
    if !anchor.offsets_in_bounds() {
        return None;
    }

    let container = view
        .elements_by_tag(&anchor.container_tag_name)
        .into_iter()
        .find(|&el| view.outer_html(el) == anchor.container_snapshot_html)?;

    let text_node = view
        .child_text_nodes(container)
        .into_iter()
        .find(|&t| view.text_content(t) == anchor.text_content)?;

    let start = view.byte_offset(text_node, anchor.start_offset)?;
    let end = view.byte_offset(text_node, anchor.end_offset)?;

    Some(ResolvedAnchor {
        container,
        text_node,
        start_offset: anchor.start_offset,
        end_offset: anchor.end_offset,
        byte_range: start..end,
    })
}
