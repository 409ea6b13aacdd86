use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::spans::{cut, Span};

static MARKDOWN_H2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^##\s").expect("markdown heading pattern is valid"));

static HTML_H2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h2[^>]*>").expect("html heading pattern is valid"));

/// Heading styles recognised as section starts, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeadingMarker {
    Markdown,
    Html,
}

impl HeadingMarker {
    const PRIORITY: [HeadingMarker; 2] = [HeadingMarker::Markdown, HeadingMarker::Html];

    fn pattern(self) -> &'static Regex {
        match self {
            HeadingMarker::Markdown => &MARKDOWN_H2,
            HeadingMarker::Html => &HTML_H2,
        }
    }
}

/// Partition the document into level-2 sections.
///
/// The first marker style producing at least two sections wins; otherwise the
/// whole document is a single section. An empty document has no sections.
pub(super) fn scan_sections(document: &str) -> Vec<Span> {
    if document.is_empty() {
        return Vec::new();
    }
    let whole = Span::measure(document, 0, document.len());
    for marker in HeadingMarker::PRIORITY {
        let sections = split_before(document, whole, marker);
        if sections.len() > 1 {
            debug!(?marker, sections = sections.len(), "sectioned document");
            return sections;
        }
    }
    debug!("no level-2 headings found; treating document as one section");
    vec![whole]
}

pub(super) fn split_before(document: &str, whole: Span, marker: HeadingMarker) -> Vec<Span> {
    let offsets = marker
        .pattern()
        .find_iter(document)
        .map(|found| found.start());
    cut(document, whole, offsets)
}
