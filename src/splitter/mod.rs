//! Section-preserving document splitter.
//!
//! Splits a generated Markdown or HTML document into chunks bounded by a
//! character ceiling and a byte ceiling, keeping level-2 sections together
//! whenever they fit.

mod accumulator;
mod atoms;
mod files;
mod planner;
mod sections;
mod spans;


pub use files::FileSplitter;
pub use planner::{split, split_document};

use spans::Span;

/// One output unit of the splitter, borrowed from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub text: &'a str,
    pub char_count: usize,
    /// Contains a fixed-width slice; such chunks respect `max_chars` but may
    /// exceed `max_bytes` for multi-byte text.
    pub forced: bool,
}

impl<'a> Chunk<'a> {
    fn from_span(document: &'a str, span: Span) -> Self {
        Self {
            text: span.text(document),
            char_count: span.chars,
            forced: span.forced,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}
