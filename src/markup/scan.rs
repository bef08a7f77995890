//! Source-span document model
//!
//! A `DocumentView` indexes a rendered document's markup without building a
//! mutable tree: every element and text node is a byte span into the
//! original string. Views are rebuilt from scratch each time a document is
//! opened, so node indices are meaningless across loads; only the text and
//! markup content itself is stable.
//!
//! The scan is lenient in the way rendering engines are: stray end tags are
//! ignored, unclosed elements are closed by their nearest closing ancestor
//! or at end of input, comments and doctypes are skipped, and `script` /
//! `style` contents are treated as raw text.

use std::ops::Range;

/// Elements that never have children and never carry an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text until the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Handle to an element within one `DocumentView`. Not stable across views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// Handle to a text node within one `DocumentView`. Not stable across views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextNodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    span: Range<usize>,
    parent: Option<usize>,
}

#[derive(Debug, Clone)]
struct TextNode {
    span: Range<usize>,
    parent: Option<usize>,
}

/// An indexed view over one rendered document.
#[derive(Debug, Clone)]
pub struct DocumentView {
    html: String,
    elements: Vec<Element>,
    texts: Vec<TextNode>,
}

impl DocumentView {
    /// Scan a document. Infallible: malformed markup degrades to fewer
    /// indexed nodes, never to an error.
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let (elements, texts) = scan(&html);
        Self {
            html,
            elements,
            texts,
        }
    }

    /// The document markup this view indexes.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn text_node_count(&self) -> usize {
        self.texts.len()
    }

    /// All elements with the given tag name, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<ElementId> {
        let tag = tag.to_ascii_lowercase();
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.tag == tag)
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    /// Lowercased tag name of an element.
    pub fn tag(&self, id: ElementId) -> &str {
        &self.elements[id.0].tag
    }

    /// Full serialized markup of an element, exactly as it appears in the
    /// source.
    pub fn outer_html(&self, id: ElementId) -> &str {
        &self.html[self.elements[id.0].span.clone()]
    }

    pub fn element_span(&self, id: ElementId) -> Range<usize> {
        self.elements[id.0].span.clone()
    }

    /// Direct child text nodes of an element, in document order.
    pub fn child_text_nodes(&self, id: ElementId) -> Vec<TextNodeId> {
        self.texts
            .iter()
            .enumerate()
            .filter(|(_, t)| t.parent == Some(id.0))
            .map(|(i, _)| TextNodeId(i))
            .collect()
    }

    /// Source text of a text node.
    pub fn text_content(&self, id: TextNodeId) -> &str {
        &self.html[self.texts[id.0].span.clone()]
    }

    pub fn text_span(&self, id: TextNodeId) -> Range<usize> {
        self.texts[id.0].span.clone()
    }

    /// The nearest element ancestor of a text node. `None` for text outside
    /// any element.
    pub fn parent_element(&self, id: TextNodeId) -> Option<ElementId> {
        self.texts[id.0].parent.map(ElementId)
    }

    /// First text node whose content equals `needle`, in document order.
    pub fn find_text_node(&self, needle: &str) -> Option<TextNodeId> {
        (0..self.texts.len())
            .map(TextNodeId)
            .find(|&id| self.text_content(id) == needle)
    }

    /// Absolute byte offset of the `char_offset`-th character of a text
    /// node. `None` when the offset lies past the end of the node.
    pub fn byte_offset(&self, id: TextNodeId, char_offset: usize) -> Option<usize> {
        let node = self.texts.get(id.0)?;
        let content = &self.html[node.span.clone()];
        if char_offset == 0 {
            return Some(node.span.start);
        }
        match content.char_indices().nth(char_offset) {
            Some((i, _)) => Some(node.span.start + i),
            None => (content.chars().count() == char_offset).then_some(node.span.end),
        }
    }
}

/// Scan `>`-terminated tag markup starting just past the tag name, honoring
/// quoted attribute values. Returns the index past `>` and whether the tag
/// was self-closing.
pub(crate) fn scan_tag_end(bytes: &[u8], mut i: usize) -> Option<(usize, bool)> {
    let mut quote: Option<u8> = None;
    let mut last_meaningful = 0u8;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some((i + 1, last_meaningful == b'/')),
                _ => {
                    if !b.is_ascii_whitespace() {
                        last_meaningful = b;
                    }
                }
            },
        }
        i += 1;
    }
    None
}

fn find_case_insensitive(html: &str, needle: &str, from: usize) -> Option<usize> {
    let h = html.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() || from > h.len() - n.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn tag_name_at(html: &str, from: usize) -> Option<(String, usize)> {
    let bytes = html.as_bytes();
    if from >= bytes.len() || !bytes[from].is_ascii_alphabetic() {
        return None;
    }
    let mut end = from;
    while end < bytes.len()
        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'-' || bytes[end] == b':')
    {
        end += 1;
    }
    Some((html[from..end].to_ascii_lowercase(), end))
}

fn scan(html: &str) -> (Vec<Element>, Vec<TextNode>) {
    let bytes = html.as_bytes();
    let len = bytes.len();
    let mut elements: Vec<Element> = Vec::new();
    let mut texts: Vec<TextNode> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut pos = 0;

    let push_text = |span: Range<usize>, parent: Option<usize>, texts: &mut Vec<TextNode>| {
        if !span.is_empty() {
            texts.push(TextNode { span, parent });
        }
    };

    while pos < len {
        let Some(rel) = html[pos..].find('<') else {
            push_text(pos..len, stack.last().copied(), &mut texts);
            break;
        };
        let lt = pos + rel;
        push_text(pos..lt, stack.last().copied(), &mut texts);
        pos = lt;

        let rest = &html[pos..];
        if rest.starts_with("<!--") {
            pos = match rest.find("-->") {
                Some(j) => pos + j + 3,
                None => len,
            };
        } else if rest.starts_with("</") {
            let Some((name, after_name)) = tag_name_at(html, pos + 2) else {
                // "</" with no tag name: treat the bracket as text
                push_text(pos..pos + 1, stack.last().copied(), &mut texts);
                pos += 1;
                continue;
            };
            let tag_end = match html[after_name..].find('>') {
                Some(j) => after_name + j + 1,
                None => len,
            };
            if let Some(depth) = stack.iter().rposition(|&ei| elements[ei].tag == name) {
                // implicitly close anything the end tag jumps over
                for &ei in &stack[depth + 1..] {
                    elements[ei].span.end = pos;
                }
                elements[stack[depth]].span.end = tag_end;
                stack.truncate(depth);
            }
            pos = tag_end;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = match rest.find('>') {
                Some(j) => pos + j + 1,
                None => len,
            };
        } else if let Some((name, after_name)) = tag_name_at(html, pos + 1) {
            let Some((tag_end, self_closing)) = scan_tag_end(bytes, after_name) else {
                break;
            };
            let parent = stack.last().copied();
            let index = elements.len();
            elements.push(Element {
                tag: name.clone(),
                span: pos..tag_end,
                parent,
            });
            if self_closing || is_void(&name) {
                pos = tag_end;
            } else if is_raw_text(&name) {
                let close_pat = format!("</{}", name);
                match find_case_insensitive(html, &close_pat, tag_end) {
                    Some(close_start) => {
                        push_text(tag_end..close_start, Some(index), &mut texts);
                        let end = match html[close_start..].find('>') {
                            Some(j) => close_start + j + 1,
                            None => len,
                        };
                        elements[index].span.end = end;
                        pos = end;
                    }
                    None => {
                        push_text(tag_end..len, Some(index), &mut texts);
                        elements[index].span.end = len;
                        pos = len;
                    }
                }
            } else {
                stack.push(index);
                pos = tag_end;
            }
        } else {
            // lone '<' that opens nothing: text
            push_text(pos..pos + 1, stack.last().copied(), &mut texts);
            pos += 1;
        }
    }

    // anything still open runs to end of input
    while let Some(ei) = stack.pop() {
        elements[ei].span.end = len;
    }

    (elements, texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_paragraph() {
        let view = DocumentView::parse("<p>Hello world</p>");
        assert_eq!(view.element_count(), 1);
        assert_eq!(view.text_node_count(), 1);

        let p = view.elements_by_tag("p")[0];
        assert_eq!(view.tag(p), "p");
        assert_eq!(view.outer_html(p), "<p>Hello world</p>");

        let text = view.child_text_nodes(p)[0];
        assert_eq!(view.text_content(text), "Hello world");
        assert_eq!(view.parent_element(text), Some(p));
    }

    #[test]
    fn test_nested_elements_and_direct_children() {
        let view = DocumentView::parse("<div>before<p>inner</p>after</div>");
        let div = view.elements_by_tag("div")[0];
        let children: Vec<&str> = view
            .child_text_nodes(div)
            .into_iter()
            .map(|t| view.text_content(t))
            .collect();
        assert_eq!(children, vec!["before", "after"]);

        let p = view.elements_by_tag("p")[0];
        let inner: Vec<&str> = view
            .child_text_nodes(p)
            .into_iter()
            .map(|t| view.text_content(t))
            .collect();
        assert_eq!(inner, vec!["inner"]);
    }

    #[test]
    fn test_document_order_by_tag() {
        let view = DocumentView::parse("<p>one</p><div><p>two</p></div><p>three</p>");
        let texts: Vec<&str> = view
            .elements_by_tag("p")
            .into_iter()
            .map(|p| view.text_content(view.child_text_nodes(p)[0]))
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let view = DocumentView::parse("<p>a<br>b<img src=\"x.png\"/>c</p>");
        let p = view.elements_by_tag("p")[0];
        let children: Vec<&str> = view
            .child_text_nodes(p)
            .into_iter()
            .map(|t| view.text_content(t))
            .collect();
        assert_eq!(children, vec!["a", "b", "c"]);
        assert_eq!(view.elements_by_tag("br").len(), 1);
        assert_eq!(view.elements_by_tag("img").len(), 1);
    }

    #[test]
    fn test_attribute_with_angle_bracket_in_quotes() {
        let view = DocumentView::parse(r#"<p title="a > b">text</p>"#);
        let p = view.elements_by_tag("p")[0];
        assert_eq!(view.outer_html(p), r#"<p title="a > b">text</p>"#);
        assert_eq!(view.text_content(view.child_text_nodes(p)[0]), "text");
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let view = DocumentView::parse("<!DOCTYPE html><!-- note --><p>x</p>");
        assert_eq!(view.element_count(), 1);
        assert_eq!(view.text_node_count(), 1);
    }

    #[test]
    fn test_script_content_is_raw_text() {
        let view = DocumentView::parse("<div><script>if (a < b) { run() }</script></div>");
        let script = view.elements_by_tag("script")[0];
        let content = view.child_text_nodes(script)[0];
        assert_eq!(view.text_content(content), "if (a < b) { run() }");
        // the comparison inside the script must not open an element
        assert_eq!(view.element_count(), 2);
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let view = DocumentView::parse("<p>a</span>b</p>");
        let p = view.elements_by_tag("p")[0];
        assert_eq!(view.outer_html(p), "<p>a</span>b</p>");
        let children: Vec<&str> = view
            .child_text_nodes(p)
            .into_iter()
            .map(|t| view.text_content(t))
            .collect();
        assert_eq!(children, vec!["a", "b"]);
    }

    #[test]
    fn test_unclosed_element_closed_by_ancestor() {
        let view = DocumentView::parse("<div><p>open</div>tail");
        let p = view.elements_by_tag("p")[0];
        assert_eq!(view.outer_html(p), "<p>open");
        let div = view.elements_by_tag("div")[0];
        assert_eq!(view.outer_html(div), "<div><p>open</div>");
    }

    #[test]
    fn test_byte_offset_ascii() {
        let view = DocumentView::parse("<p>Hello</p>");
        let text = view.child_text_nodes(view.elements_by_tag("p")[0])[0];
        let start = view.text_span(text).start;
        assert_eq!(view.byte_offset(text, 0), Some(start));
        assert_eq!(view.byte_offset(text, 5), Some(start + 5));
        assert_eq!(view.byte_offset(text, 6), None);
    }

    #[test]
    fn test_byte_offset_multibyte() {
        let view = DocumentView::parse("<p>héllo</p>");
        let text = view.child_text_nodes(view.elements_by_tag("p")[0])[0];
        let start = view.text_span(text).start;
        // 'é' is two bytes; character offsets must not split it
        assert_eq!(view.byte_offset(text, 1), Some(start + 1));
        assert_eq!(view.byte_offset(text, 2), Some(start + 3));
        assert_eq!(view.byte_offset(text, 5), Some(start + 6));
    }

    #[test]
    fn test_find_text_node_first_match() {
        let view = DocumentView::parse("<p>dup</p><p>dup</p>");
        let found = view.find_text_node("dup").unwrap();
        let first = view.child_text_nodes(view.elements_by_tag("p")[0])[0];
        assert_eq!(found, first);
    }
}
