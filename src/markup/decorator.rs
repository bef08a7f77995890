//! Decoration painting
//!
//! Paints highlight and comment decorations over a document's markup by
//! splicing `<mark>` wrappers around resolved byte ranges. Painting never
//! fails the caller: a range that cannot be wrapped cleanly falls back to
//! wrapping its extracted contents when the slice is tag-balanced, and is
//! skipped otherwise.

use std::ops::Range;

use super::scan::{is_void, scan_tag_end};

/// Configuration for decoration painting
#[derive(Debug, Clone)]
pub struct DecorationConfig {
    /// CSS class prefix for decorations
    pub class_prefix: String,
    /// Data attribute carrying the record id
    pub id_attribute: String,
    /// Data attribute carrying the decoration kind
    pub kind_attribute: String,
    /// Whether to include inline styles
    pub include_inline_styles: bool,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            class_prefix: "mg-deco".to_string(),
            id_attribute: "data-annotation-id".to_string(),
            kind_attribute: "data-annotation-kind".to_string(),
            include_inline_styles: true,
        }
    }
}

/// What a decoration marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    /// Color-washed text
    Highlight,
    /// Commented span
    Note,
}

impl DecorationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationKind::Highlight => "highlight",
            DecorationKind::Note => "note",
        }
    }
}

/// One decoration to paint
#[derive(Debug, Clone)]
pub struct PaintSpec {
    /// Record id (durable or placeholder)
    pub id: String,
    pub kind: DecorationKind,
    /// CSS background color for highlights
    pub color: Option<String>,
}

/// Result of painting a set of decorations
#[derive(Debug)]
pub struct PaintOutcome {
    /// The markup with decoration wrappers spliced in
    pub html: String,
    /// Number of decorations painted
    pub painted: usize,
    /// Ids of decorations that could not be rendered
    pub skipped: Vec<String>,
}

/// Paints decorations into document markup
#[derive(Debug, Clone, Default)]
pub struct Decorator {
    config: DecorationConfig,
}

enum WrapMode {
    /// Pure text, wrap in place
    Clean,
    /// Straddles markup but the slice is tag-balanced; re-insert the
    /// extracted contents inside the wrapper
    Contents,
}

impl Decorator {
    pub fn new(config: DecorationConfig) -> Self {
        Self { config }
    }

    /// Paint every decoration whose range can be wrapped. Ranges are byte
    /// ranges into `html`. Overlapping ranges are independent decorations:
    /// the first by document position (then arrival) wins and later
    /// overlaps are skipped, since crossing wrapper boundaries would
    /// corrupt the markup.
    pub fn paint(&self, html: &str, decorations: &[(Range<usize>, PaintSpec)]) -> PaintOutcome {
        let mut skipped = Vec::new();
        let mut accepted: Vec<(&Range<usize>, &PaintSpec, WrapMode)> = Vec::new();

        let mut ordered: Vec<&(Range<usize>, PaintSpec)> = decorations.iter().collect();
        ordered.sort_by_key(|(range, _)| range.start);

        let mut painted_until = 0usize;
        for (range, spec) in ordered {
            if range.start > range.end
                || range.end > html.len()
                || !html.is_char_boundary(range.start)
                || !html.is_char_boundary(range.end)
            {
                skipped.push(spec.id.clone());
                continue;
            }
            if range.start < painted_until && !accepted.is_empty() {
                tracing::debug!(id = %spec.id, "skipping overlapping decoration");
                skipped.push(spec.id.clone());
                continue;
            }
            let slice = &html[range.clone()];
            let mode = if !slice.contains('<') {
                WrapMode::Clean
            } else if is_tag_balanced(slice) {
                WrapMode::Contents
            } else {
                tracing::debug!(id = %spec.id, "range straddles unbalanced markup, skipping");
                skipped.push(spec.id.clone());
                continue;
            };
            painted_until = range.end;
            accepted.push((range, spec, mode));
        }

        let mut output = String::with_capacity(html.len() + accepted.len() * 96);
        let mut cursor = 0usize;
        let painted = accepted.len();
        for (range, spec, _mode) in accepted {
            output.push_str(&html[cursor..range.start]);
            output.push_str(&self.open_tag(spec));
            output.push_str(&html[range.clone()]);
            output.push_str("</mark>");
            cursor = range.end;
        }
        output.push_str(&html[cursor..]);

        PaintOutcome {
            html: output,
            painted,
            skipped,
        }
    }

    fn open_tag(&self, spec: &PaintSpec) -> String {
        let class = format!(
            "{} {}-{}",
            self.config.class_prefix,
            self.config.class_prefix,
            spec.kind.as_str()
        );

        let style = match (&spec.color, self.config.include_inline_styles) {
            (Some(color), true) => format!(
                " style=\"background-color: {};\"",
                html_escape::encode_double_quoted_attribute(color)
            ),
            _ => String::new(),
        };

        format!(
            "<mark class=\"{}\" {}=\"{}\" {}=\"{}\"{}>",
            class,
            self.config.id_attribute,
            html_escape::encode_double_quoted_attribute(&spec.id),
            self.config.kind_attribute,
            spec.kind.as_str(),
            style,
        )
    }
}

/// Whether every tag opened inside `slice` also closes inside it, with no
/// stray end tags. Wrapping an unbalanced slice would interleave the
/// wrapper with the document's own tags.
fn is_tag_balanced(slice: &str) -> bool {
    let bytes = slice.as_bytes();
    let mut stack: Vec<String> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let rest = &slice[i..];
        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(j) => i += j + 3,
                None => return false,
            }
        } else if rest.starts_with("</") {
            let name: String = slice[i + 2..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
                .collect::<String>()
                .to_ascii_lowercase();
            match stack.pop() {
                Some(open) if open == name => {}
                _ => return false,
            }
            match rest.find('>') {
                Some(j) => i += j + 1,
                None => return false,
            }
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            match rest.find('>') {
                Some(j) => i += j + 1,
                None => return false,
            }
        } else {
            let name: String = slice[i + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
                .collect::<String>()
                .to_ascii_lowercase();
            if name.is_empty() {
                i += 1;
                continue;
            }
            let Some((after, self_closing)) = scan_tag_end(bytes, i + 1 + name.len()) else {
                return false;
            };
            if !self_closing && !is_void(&name) {
                stack.push(name);
            }
            i = after;
        }
    }
    stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, kind: DecorationKind) -> PaintSpec {
        PaintSpec {
            id: id.to_string(),
            kind,
            color: None,
        }
    }

    #[test]
    fn test_clean_wrap() {
        let html = "<p>Hello world</p>";
        let deco = Decorator::default();
        // wrap "world"
        let outcome = deco.paint(html, &[(9..14, spec("h1", DecorationKind::Highlight))]);

        assert_eq!(outcome.painted, 1);
        assert!(outcome.skipped.is_empty());
        assert!(outcome.html.contains("Hello <mark"));
        assert!(outcome.html.contains(">world</mark></p>"));
        assert!(outcome.html.contains("data-annotation-id=\"h1\""));
        assert!(outcome.html.contains("mg-deco-highlight"));
    }

    #[test]
    fn test_highlight_color_style() {
        let html = "<p>Hello</p>";
        let deco = Decorator::default();
        let outcome = deco.paint(
            html,
            &[(
                3..8,
                PaintSpec {
                    id: "h1".to_string(),
                    kind: DecorationKind::Highlight,
                    color: Some("yellow".to_string()),
                },
            )],
        );
        assert!(outcome.html.contains("background-color: yellow"));
    }

    #[test]
    fn test_balanced_straddle_falls_back_to_contents_wrap() {
        let html = "<p>one <em>two</em> three</p>";
        let deco = Decorator::default();
        // "one <em>two</em> three" — contains balanced markup
        let outcome = deco.paint(html, &[(3..25, spec("n1", DecorationKind::Note))]);

        assert_eq!(outcome.painted, 1);
        assert!(outcome.html.contains("<mark"));
        assert!(outcome.html.contains("one <em>two</em> three</mark>"));
    }

    #[test]
    fn test_unbalanced_straddle_skipped() {
        let html = "<p>one <em>two</em> three</p>";
        let deco = Decorator::default();
        // cuts into the middle of the <em> element
        let outcome = deco.paint(html, &[(3..14, spec("n1", DecorationKind::Note))]);

        assert_eq!(outcome.painted, 0);
        assert_eq!(outcome.skipped, vec!["n1".to_string()]);
        assert_eq!(outcome.html, html);
    }

    #[test]
    fn test_overlapping_ranges_first_wins() {
        let html = "<p>abcdefgh</p>";
        let deco = Decorator::default();
        let outcome = deco.paint(
            html,
            &[
                (3..7, spec("a", DecorationKind::Highlight)),
                (5..9, spec("b", DecorationKind::Highlight)),
            ],
        );

        assert_eq!(outcome.painted, 1);
        assert_eq!(outcome.skipped, vec!["b".to_string()]);
        assert!(outcome.html.contains(">abcd</mark>"));
    }

    #[test]
    fn test_disjoint_ranges_all_painted() {
        let html = "<p>abcdefgh</p>";
        let deco = Decorator::default();
        let outcome = deco.paint(
            html,
            &[
                (7..9, spec("b", DecorationKind::Highlight)),
                (3..5, spec("a", DecorationKind::Note)),
            ],
        );

        assert_eq!(outcome.painted, 2);
        assert!(outcome.skipped.is_empty());
        assert!(outcome.html.contains(">ab</mark>"));
        assert!(outcome.html.contains(">ef</mark>"));
    }

    #[test]
    fn test_out_of_bounds_range_skipped() {
        let html = "<p>short</p>";
        let deco = Decorator::default();
        let outcome = deco.paint(html, &[(3..999, spec("x", DecorationKind::Highlight))]);

        assert_eq!(outcome.painted, 0);
        assert_eq!(outcome.skipped, vec!["x".to_string()]);
        assert_eq!(outcome.html, html);
    }

    #[test]
    fn test_attribute_escaping() {
        let html = "<p>text</p>";
        let deco = Decorator::default();
        let outcome = deco.paint(
            html,
            &[(
                3..7,
                PaintSpec {
                    id: "a\"b".to_string(),
                    kind: DecorationKind::Note,
                    color: None,
                },
            )],
        );
        assert!(!outcome.html.contains("id=\"a\"b\""));
        assert!(outcome.html.contains("a&quot;b"));
    }

    #[test]
    fn test_balance_checker() {
        assert!(is_tag_balanced("plain text"));
        assert!(is_tag_balanced("a <em>b</em> c"));
        assert!(is_tag_balanced("<span><b>x</b></span>"));
        assert!(is_tag_balanced("a <br> b"));
        assert!(!is_tag_balanced("a <em>b"));
        assert!(!is_tag_balanced("b</em> c"));
        assert!(!is_tag_balanced("<em>a</span>"));
    }
}
