use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SplitLimits;

use super::spans::{cut, Span};

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// Progressively finer ways of breaking up an oversized section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Refinement {
    Paragraph,
    Sentence,
    FixedWidth,
}

const REFINEMENTS: [Refinement; 3] = [
    Refinement::Paragraph,
    Refinement::Sentence,
    Refinement::FixedWidth,
];

impl Refinement {
    pub(super) fn split(self, document: &str, span: Span, limits: SplitLimits) -> Vec<Span> {
        let text = span.text(document);
        match self {
            Refinement::Paragraph => {
                let bytes = text.as_bytes();
                let offsets = (2..bytes.len())
                    .filter(|&idx| bytes[idx - 2] == b'\n' && bytes[idx - 1] == b'\n')
                    .map(|idx| span.start + idx);
                cut(document, span, offsets)
            }
            Refinement::Sentence => {
                let offsets = SENTENCE_END
                    .find_iter(text)
                    .map(|found| span.start + found.end());
                cut(document, span, offsets)
            }
            Refinement::FixedWidth => {
                let offsets = text
                    .char_indices()
                    .map(|(idx, _)| span.start + idx)
                    .step_by(limits.slice_width())
                    .skip(1);
                cut(document, span, offsets)
                    .into_iter()
                    .map(|piece| Span {
                        forced: true,
                        ..piece
                    })
                    .collect()
            }
        }
    }
}

/// Break an oversized section into atoms that concatenate back to it.
///
/// Each refinement is tried in order until one yields more than one piece;
/// pieces still over a limit continue with the next finer refinement. Only
/// fixed-width slices can come out oversized.
pub(super) fn decompose(document: &str, section: Span, limits: SplitLimits) -> Vec<Span> {
    let mut atoms = Vec::new();
    refine(document, section, 0, limits, &mut atoms);
    atoms
}

fn refine(document: &str, span: Span, level: usize, limits: SplitLimits, atoms: &mut Vec<Span>) {
    if limits.admits(span.chars, span.bytes()) {
        atoms.push(span);
        return;
    }
    for (step, refinement) in REFINEMENTS.iter().enumerate().skip(level) {
        let pieces = refinement.split(document, span, limits);
        if *refinement == Refinement::FixedWidth {
            atoms.extend(pieces);
            return;
        }
        if pieces.len() > 1 {
            for piece in pieces {
                refine(document, piece, step + 1, limits, atoms);
            }
            return;
        }
    }
    atoms.push(span);
}
