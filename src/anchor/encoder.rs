//! Selection capture
//!
//! A selection is a scoped session over one document view with an explicit
//! begin/confirm/cancel lifecycle. Confirming produces the descriptor plus
//! the selected text; cancelling (or dropping) produces nothing and leaves
//! no state behind.

use crate::markup::{DocumentView, ElementId, TextNodeId};

use super::types::{char_slice, AnchorDescriptor};

/// A confirmed selection, ready to persist and broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSelection {
    pub anchor: AnchorDescriptor,
    /// The selected text, for display and storage alongside the anchor
    pub selected_text: String,
}

/// An in-progress selection over a document view
///
/// Captures the textual content of the start node and the serialized
/// markup of its nearest element ancestor — never a reference to either
/// node, since the view is rebuilt on every document load.
#[derive(Debug)]
pub struct SelectionSession<'a> {
    view: &'a DocumentView,
    node: TextNodeId,
    container: ElementId,
    start_offset: usize,
    end_offset: usize,
}

impl<'a> SelectionSession<'a> {
    /// Begin a selection session. Produces nothing for empty selections,
    /// offsets beyond the node's content, or text nodes with no element
    /// ancestor to fingerprint.
    pub fn begin(
        view: &'a DocumentView,
        node: TextNodeId,
        start_offset: usize,
        end_offset: usize,
    ) -> Option<Self> {
        if start_offset >= end_offset {
            return None;
        }
        let content = view.text_content(node);
        if end_offset > content.chars().count() {
            return None;
        }
        let container = view.parent_element(node)?;
        Some(Self {
            view,
            node,
            container,
            start_offset,
            end_offset,
        })
    }

    /// The text this session has selected
    pub fn selected_text(&self) -> &str {
        char_slice(
            self.view.text_content(self.node),
            self.start_offset,
            self.end_offset,
        )
        .unwrap_or_default()
    }

    /// Confirm the selection, producing a portable descriptor
    pub fn confirm(self) -> EncodedSelection {
        let anchor = AnchorDescriptor {
            container_tag_name: self.view.tag(self.container).to_string(),
            container_snapshot_html: self.view.outer_html(self.container).to_string(),
            text_content: self.view.text_content(self.node).to_string(),
            start_offset: self.start_offset,
            end_offset: self.end_offset,
        };
        let selected_text = self.selected_text().to_string();
        EncodedSelection {
            anchor,
            selected_text,
        }
    }

    /// Abandon the selection; nothing is captured
    pub fn cancel(self) {}
}
