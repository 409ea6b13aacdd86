use tracing::debug;

use crate::config::SplitLimits;
use crate::error::Result;

use super::accumulator::ChunkAccumulator;
use super::atoms::decompose;
use super::sections::scan_sections;
use super::spans::Span;
use super::Chunk;

/// Validate the limits, then split `document`.
///
/// Fails only when a limit is zero; the split itself is total.
pub fn split(document: &str, max_chars: usize, max_bytes: usize) -> Result<Vec<Chunk<'_>>> {
    let limits = SplitLimits::new(max_chars, max_bytes)?;
    Ok(split_document(document, limits))
}

/// Partition `document` into size-bounded chunks along section boundaries.
///
/// Concatenating the returned chunks reproduces `document` exactly. An empty
/// document yields no chunks.
pub fn split_document(document: &str, limits: SplitLimits) -> Vec<Chunk<'_>> {
    let sections = scan_sections(document);
    let mut accumulator = ChunkAccumulator::new(limits);
    for section in sections {
        if limits.admits(section.chars, section.bytes()) {
            accumulator.push(section);
            continue;
        }
        let atoms = decompose(document, section, limits);
        debug!(
            chars = section.chars,
            bytes = section.bytes(),
            atoms = atoms.len(),
            "decomposed oversized section"
        );
        for atom in atoms {
            accumulator.push(atom);
        }
    }
    let packed = accumulator.into_spans();
    let spans = reoptimize(packed, limits);
    debug!(chunks = spans.len(), "split document");
    spans
        .into_iter()
        .map(|span| Chunk::from_span(document, span))
        .collect()
}

/// Merge adjacent chunks with the same fit-or-close rule, keeping the result
/// only when it is strictly smaller.
pub(super) fn reoptimize(chunks: Vec<Span>, limits: SplitLimits) -> Vec<Span> {
    if chunks.len() < 2 {
        return chunks;
    }
    let mut accumulator = ChunkAccumulator::new(limits);
    for chunk in &chunks {
        accumulator.push(*chunk);
    }
    let merged = accumulator.into_spans();
    if merged.len() < chunks.len() {
        debug!(before = chunks.len(), after = merged.len(), "merged adjacent chunks");
        merged
    } else {
        chunks
    }
}
