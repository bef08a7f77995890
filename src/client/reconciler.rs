//! Decoration reconciliation
//!
//! One reconciler per open document merges three sources that arrive at
//! different times by different paths: the historical list fetched once
//! when the document opens, locally created records painted optimistically
//! before the store confirms them, and inbound broadcast events. The
//! contract is a single non-duplicating rendered set: no id is ever
//! painted twice, and a record whose anchor cannot be resolved right now
//! is skipped without disturbing the rest.

use std::collections::HashMap;
use std::ops::Range;

use uuid::Uuid;

use crate::anchor::{resolve, AnchorDescriptor, EncodedSelection};
use crate::annotations::{Annotation, Highlight, HighlightColor};
use crate::markup::{DecorationKind, Decorator, DocumentView, PaintOutcome, PaintSpec};
use crate::sync::SyncEvent;

/// One decoration in the rendered set
#[derive(Debug, Clone)]
struct Decoration {
    kind: DecorationKind,
    color: Option<HighlightColor>,
    byte_range: Range<usize>,
}

/// Merges historical, optimistic, and broadcast-sourced records into one
/// deduplicated rendered view of a single document.
pub struct Reconciler {
    document_id: String,
    view: DocumentView,
    decorator: Decorator,
    rendered: HashMap<String, Decoration>,
    /// Arrival order; painting position still sorts by document offset
    order: Vec<String>,
}

impl Reconciler {
    pub fn new(document_id: impl Into<String>, view: DocumentView) -> Self {
        Self {
            document_id: document_id.into(),
            view,
            decorator: Decorator::default(),
            rendered: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn view(&self) -> &DocumentView {
        &self.view
    }

    pub fn decoration_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rendered.contains_key(id)
    }

    /// Merge the historical list fetched at open. Returns how many records
    /// resolved and were painted; the rest are not renderable yet.
    pub fn load_history(&mut self, annotations: &[Annotation], highlights: &[Highlight]) -> usize {
        let mut painted = 0;
        for a in annotations {
            if self.insert(&a.id, &a.document_id, &a.anchor, DecorationKind::Note, None) {
                painted += 1;
            }
        }
        for h in highlights {
            if self.insert(
                &h.id,
                &h.document_id,
                &h.anchor,
                DecorationKind::Highlight,
                Some(h.color),
            ) {
                painted += 1;
            }
        }
        painted
    }

    /// Paint a locally created selection immediately, before the store
    /// confirms it. Returns the placeholder id on success, `None` when the
    /// selection does not resolve against this view.
    pub fn add_local(
        &mut self,
        selection: &EncodedSelection,
        kind: DecorationKind,
        color: Option<HighlightColor>,
    ) -> Option<String> {
        let placeholder = format!("local-{}", Uuid::new_v4());
        let document_id = self.document_id.clone();
        self.insert(&placeholder, &document_id, &selection.anchor, kind, color)
            .then_some(placeholder)
    }

    /// Retag an optimistic decoration with its store-assigned id. The
    /// decoration itself is not repainted. If the durable id is somehow
    /// already rendered, the placeholder is dropped so exactly one
    /// decoration remains.
    pub fn confirm_local(&mut self, placeholder: &str, durable_id: &str) -> bool {
        let Some(decoration) = self.rendered.remove(placeholder) else {
            return false;
        };
        if self.rendered.contains_key(durable_id) {
            self.order.retain(|id| id != placeholder);
            return true;
        }
        self.rendered.insert(durable_id.to_string(), decoration);
        for id in &mut self.order {
            if id == placeholder {
                *id = durable_id.to_string();
            }
        }
        true
    }

    /// Apply an inbound broadcast event. Returns whether a new decoration
    /// was painted; duplicates and resolution misses return `false`.
    pub fn apply_event(&mut self, event: &SyncEvent) -> bool {
        match event {
            SyncEvent::Annotation(a) => {
                self.insert(&a.id, &a.document_id, &a.anchor, DecorationKind::Note, None)
            }
            SyncEvent::Highlight(h) => self.insert(
                &h.id,
                &h.document_id,
                &h.anchor,
                DecorationKind::Highlight,
                Some(h.color),
            ),
        }
    }

    /// Remove one decoration, e.g. after a delete-by-id
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.rendered.remove(id).is_some();
        if removed {
            self.order.retain(|entry| entry != id);
        }
        removed
    }

    /// Clear every decoration; used with a bulk document reset
    pub fn reset(&mut self) {
        self.rendered.clear();
        self.order.clear();
    }

    /// Paint the merged set over the base markup
    pub fn render(&self) -> PaintOutcome {
        let decorations: Vec<(Range<usize>, PaintSpec)> = self
            .order
            .iter()
            .filter_map(|id| {
                self.rendered.get(id).map(|d| {
                    (
                        d.byte_range.clone(),
                        PaintSpec {
                            id: id.clone(),
                            kind: d.kind,
                            color: d.color.map(|c| c.css().to_string()),
                        },
                    )
                })
            })
            .collect();
        self.decorator.paint(self.view.html(), &decorations)
    }

    fn insert(
        &mut self,
        id: &str,
        document_id: &str,
        anchor: &AnchorDescriptor,
        kind: DecorationKind,
        color: Option<HighlightColor>,
    ) -> bool {
        if document_id != self.document_id {
            tracing::debug!(id, document_id, "record for another document, ignoring");
            return false;
        }
        if self.rendered.contains_key(id) {
            return false;
        }
        let Some(resolved) = resolve(&self.view, anchor) else {
            tracing::debug!(id, "anchor not resolvable in current markup, skipping");
            return false;
        };
        self.rendered.insert(
            id.to_string(),
            Decoration {
                kind,
                color,
                byte_range: resolved.byte_range,
            },
        );
        self.order.push(id.to_string());
        true
    }
}
