use crate::config::SplitLimits;

use super::spans::Span;

/// Greedy fit-or-close packer shared by the packing and re-optimisation passes.
pub(super) struct ChunkAccumulator {
    limits: SplitLimits,
    closed: Vec<Span>,
    current: Option<Span>,
}

impl ChunkAccumulator {
    pub(super) fn new(limits: SplitLimits) -> Self {
        Self {
            limits,
            closed: Vec::new(),
            current: None,
        }
    }

    /// Append `span` to the open chunk if both running totals stay within the
    /// limits, otherwise close the open chunk and start a new one with it.
    pub(super) fn push(&mut self, span: Span) {
        if span.is_empty() {
            return;
        }
        match self.current {
            Some(open)
                if self
                    .limits
                    .admits(open.chars + span.chars, open.bytes() + span.bytes()) =>
            {
                self.current = Some(open.join(span));
            }
            _ => {
                self.finish_chunk();
                self.current = Some(span);
            }
        }
    }

    pub(super) fn finish_chunk(&mut self) {
        if let Some(open) = self.current.take() {
            self.closed.push(open);
        }
    }

    pub(super) fn into_spans(mut self) -> Vec<Span> {
        self.finish_chunk();
        self.closed
    }
}
