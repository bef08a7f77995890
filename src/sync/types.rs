//! Sync wire protocol
//!
//! Frames crossing the hub boundary are a tagged union and are validated
//! on receipt; malformed or inconsistent frames are dropped with a log
//! line, never applied.

use serde::{Deserialize, Serialize};

use crate::annotations::{Annotation, Highlight};

/// Frames exchanged between a client and the hub
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncMessage {
    /// Client announces interest in a document's channel
    JoinDocument {
        #[serde(rename = "documentId")]
        document_id: String,
    },
    /// A newly created annotation, rebroadcast to other members
    AnnotationUpdate {
        #[serde(rename = "documentId")]
        document_id: String,
        annotation: Annotation,
    },
    /// A newly created highlight, rebroadcast to other members
    HighlightUpdate {
        #[serde(rename = "documentId")]
        document_id: String,
        highlight: Highlight,
    },
}

/// A creation event flowing through a document channel
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Annotation(Annotation),
    Highlight(Highlight),
}

impl SyncEvent {
    pub fn document_id(&self) -> &str {
        match self {
            SyncEvent::Annotation(a) => &a.document_id,
            SyncEvent::Highlight(h) => &h.document_id,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            SyncEvent::Annotation(a) => &a.id,
            SyncEvent::Highlight(h) => &h.id,
        }
    }

    /// The outbound frame mirroring this event
    pub fn into_message(self) -> SyncMessage {
        match self {
            SyncEvent::Annotation(annotation) => SyncMessage::AnnotationUpdate {
                document_id: annotation.document_id.clone(),
                annotation,
            },
            SyncEvent::Highlight(highlight) => SyncMessage::HighlightUpdate {
                document_id: highlight.document_id.clone(),
                highlight,
            },
        }
    }
}
