//! Annotation and highlight types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::AnchorDescriptor;

/// A commented text range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier (UUID)
    pub id: String,
    /// The document this annotation belongs to
    #[serde(rename = "documentId")]
    pub document_id: String,
    /// User who created it
    #[serde(rename = "authorId", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Where the range lives in the document
    pub anchor: AnchorDescriptor,
    /// The text that was selected, for display
    #[serde(rename = "selectedText")]
    pub selected_text: String,
    /// The reader's comment
    pub comment: String,
    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A color-washed text range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Highlight {
    /// Unique identifier (UUID)
    pub id: String,
    /// The document this highlight belongs to
    #[serde(rename = "documentId")]
    pub document_id: String,
    /// User who created it
    #[serde(rename = "authorId", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Where the range lives in the document
    pub anchor: AnchorDescriptor,
    /// The text that was selected, for display
    #[serde(rename = "selectedText")]
    pub selected_text: String,
    pub color: HighlightColor,
    /// Creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Highlight colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Green,
    Blue,
    Pink,
}

impl HighlightColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Blue => "blue",
            HighlightColor::Pink => "pink",
        }
    }

    /// CSS color value for painted decorations
    pub fn css(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "#fde68a",
            HighlightColor::Green => "#bbf7d0",
            HighlightColor::Blue => "#bfdbfe",
            HighlightColor::Pink => "#fbcfe8",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yellow" => Some(HighlightColor::Yellow),
            "green" => Some(HighlightColor::Green),
            "blue" => Some(HighlightColor::Blue),
            "pink" => Some(HighlightColor::Pink),
            _ => None,
        }
    }
}

/// Create annotation request
///
/// The anchor rides in a field named `range` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAnnotation {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(rename = "authorId", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(rename = "selectedText")]
    pub selected_text: String,
    pub comment: String,
    #[serde(rename = "range")]
    pub anchor: AnchorDescriptor,
}

/// Create highlight request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHighlight {
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(rename = "authorId", skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(rename = "selectedText")]
    pub selected_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<HighlightColor>,
    #[serde(rename = "range")]
    pub anchor: AnchorDescriptor,
}

impl Annotation {
    /// Create a new annotation record
    pub fn new(
        document_id: &str,
        anchor: AnchorDescriptor,
        selected_text: &str,
        comment: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            author_id: None,
            anchor,
            selected_text: selected_text.to_string(),
            comment: comment.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Set the author
    pub fn with_author(mut self, author_id: &str) -> Self {
        self.author_id = Some(author_id.to_string());
        self
    }
}

impl Highlight {
    /// Create a new highlight record
    pub fn new(document_id: &str, anchor: AnchorDescriptor, selected_text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            author_id: None,
            anchor,
            selected_text: selected_text.to_string(),
            color: HighlightColor::default(),
            created_at: Utc::now(),
        }
    }

    /// Set the author
    pub fn with_author(mut self, author_id: &str) -> Self {
        self.author_id = Some(author_id.to_string());
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: HighlightColor) -> Self {
        self.color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> AnchorDescriptor {
        AnchorDescriptor {
            container_tag_name: "p".to_string(),
            container_snapshot_html: "<p>say hello world!</p>".to_string(),
            text_content: "say hello world!".to_string(),
            start_offset: 4,
            end_offset: 15,
        }
    }

    #[test]
    fn test_create_annotation() {
        let annotation = Annotation::new("doc-1", anchor(), "hello world", "interesting")
            .with_author("user-9");

        assert_eq!(annotation.document_id, "doc-1");
        assert_eq!(annotation.author_id.as_deref(), Some("user-9"));
        assert_eq!(annotation.comment, "interesting");
        assert!(annotation.anchor.offsets_in_bounds());
    }

    #[test]
    fn test_highlight_defaults_to_yellow() {
        let highlight = Highlight::new("doc-1", anchor(), "hello world");
        assert_eq!(highlight.color, HighlightColor::Yellow);
    }

    #[test]
    fn test_serialization_wire_names() {
        let highlight = Highlight::new("doc-1", anchor(), "hello world")
            .with_color(HighlightColor::Pink);
        let json = serde_json::to_string(&highlight).unwrap();

        assert!(json.contains("\"documentId\":\"doc-1\""));
        assert!(json.contains("\"color\":\"pink\""));
        assert!(json.contains("selectedText"));

        let parsed: Highlight = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.color, HighlightColor::Pink);
        assert_eq!(parsed.anchor, highlight.anchor);
    }

    #[test]
    fn test_create_request_uses_range_field() {
        let json = r#"{
            "documentId": "doc-1",
            "selectedText": "hello world",
            "comment": "note to self",
            "range": {
                "containerTagName": "p",
                "containerSnapshotHTML": "<p>say hello world!</p>",
                "textContent": "say hello world!",
                "startOffset": 4,
                "endOffset": 15
            }
        }"#;
        let req: CreateAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(req.anchor.container_tag_name, "p");
        assert_eq!(req.anchor.start_offset, 4);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(HighlightColor::parse("green"), Some(HighlightColor::Green));
        assert_eq!(HighlightColor::parse("crimson"), None);
    }
}
