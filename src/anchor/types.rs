//! Anchor descriptor types

use serde::{Deserialize, Serialize};

/// Portable description of a text range, independent of node identity.
///
/// The container is fingerprinted by tag name plus its full serialized
/// markup; the target text node by its exact content. Offsets are
/// character offsets into `text_content`, validated at construction so a
/// descriptor with offsets outside the content can never exist in a
/// well-typed pipeline — descriptors deserialized from the wire are
/// re-checked with [`AnchorDescriptor::offsets_in_bounds`] at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDescriptor {
    /// Tag name of the nearest element ancestor of the selection start
    #[serde(rename = "containerTagName")]
    pub container_tag_name: String,
    /// Full serialized markup of that container at encode time
    #[serde(rename = "containerSnapshotHTML")]
    pub container_snapshot_html: String,
    /// Exact content of the text node the selection starts in
    #[serde(rename = "textContent")]
    pub text_content: String,
    /// Character offset of the selection start within `text_content`
    #[serde(rename = "startOffset")]
    pub start_offset: usize,
    /// Character offset of the selection end within `text_content`
    #[serde(rename = "endOffset")]
    pub end_offset: usize,
}

impl AnchorDescriptor {
    /// `0 <= start <= end <= len(text_content)`, counted in characters
    pub fn offsets_in_bounds(&self) -> bool {
        self.start_offset <= self.end_offset
            && self.end_offset <= self.text_content.chars().count()
    }

    /// The anchored slice of `text_content`, when the offsets are valid
    pub fn anchored_text(&self) -> Option<&str> {
        char_slice(&self.text_content, self.start_offset, self.end_offset)
    }
}

/// Slice a string by character offsets
pub(crate) fn char_slice(s: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = char_to_byte(s, start)?;
    let to = char_to_byte(s, end)?;
    Some(&s[from..to])
}

fn char_to_byte(s: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    match s.char_indices().nth(char_offset) {
        Some((i, _)) => Some(i),
        None => (s.chars().count() == char_offset).then_some(s.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(text: &str, start: usize, end: usize) -> AnchorDescriptor {
        AnchorDescriptor {
            container_tag_name: "p".to_string(),
            container_snapshot_html: format!("<p>{}</p>", text),
            text_content: text.to_string(),
            start_offset: start,
            end_offset: end,
        }
    }

    #[test]
    fn test_offsets_in_bounds() {
        assert!(descriptor("hello", 0, 5).offsets_in_bounds());
        assert!(descriptor("hello", 2, 2).offsets_in_bounds());
        assert!(!descriptor("hello", 0, 6).offsets_in_bounds());
        assert!(!descriptor("hello", 4, 2).offsets_in_bounds());
    }

    #[test]
    fn test_offsets_are_character_offsets() {
        // five characters, seven bytes
        let d = descriptor("héllö", 1, 5);
        assert!(d.offsets_in_bounds());
        assert_eq!(d.anchored_text(), Some("éllö"));
    }

    #[test]
    fn test_serialization_wire_names() {
        let d = descriptor("hello world", 6, 11);
        let json = serde_json::to_string(&d).unwrap();

        assert!(json.contains("containerTagName"));
        assert!(json.contains("containerSnapshotHTML"));
        assert!(json.contains("textContent"));
        assert!(json.contains("startOffset"));
        assert!(json.contains("endOffset"));

        let parsed: AnchorDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }
}
