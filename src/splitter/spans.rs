/// A contiguous byte range of the document together with its character count.
///
/// Sections, atoms and packed chunks are all spans; they never own text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Span {
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) chars: usize,
    /// Contains a fixed-width slice, the only unit allowed over the byte limit.
    pub(super) forced: bool,
}

impl Span {
    pub(super) fn measure(document: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: document[start..end].chars().count(),
            forced: false,
        }
    }

    pub(super) fn bytes(self) -> usize {
        self.end - self.start
    }

    pub(super) fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub(super) fn text(self, document: &str) -> &str {
        &document[self.start..self.end]
    }

    /// Extend this span with the span immediately following it.
    pub(super) fn join(self, next: Span) -> Span {
        debug_assert_eq!(self.end, next.start, "spans must be adjacent");
        Span {
            start: self.start,
            end: next.end,
            chars: self.chars + next.chars,
            forced: self.forced || next.forced,
        }
    }
}

/// Cut `span` at the given absolute offsets, dropping empty pieces.
///
/// Offsets must be ascending char boundaries; offsets outside the span are
/// ignored, so the pieces always concatenate back to the span.
pub(super) fn cut(document: &str, span: Span, offsets: impl IntoIterator<Item = usize>) -> Vec<Span> {
    let mut pieces = Vec::new();
    let mut piece_start = span.start;
    for offset in offsets {
        if offset <= piece_start || offset >= span.end {
            continue;
        }
        pieces.push(Span::measure(document, piece_start, offset));
        piece_start = offset;
    }
    if piece_start < span.end {
        pieces.push(Span::measure(document, piece_start, span.end));
    }
    pieces
}
