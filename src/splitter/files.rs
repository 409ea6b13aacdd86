use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SplitLimits;
use crate::error::{Error, Result};

use super::planner::split_document;

/// Splits a document on disk into numbered part files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSplitter {
    limits: SplitLimits,
}

impl FileSplitter {
    pub fn new(limits: SplitLimits) -> Self {
        Self { limits }
    }

    /// Split `input` into `{stem}_part{N}{suffix}` files.
    ///
    /// Parts land in `output_dir`, or next to the input when `None`; existing
    /// files with the same names are overwritten. Returns the written paths in
    /// order.
    pub fn split_file(&self, input: &Path, output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let content = fs::read_to_string(input).map_err(|err| Error::io("read", input, err))?;
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => parent_dir(input),
        };

        let chunks = split_document(&content, self.limits);
        info!(
            input = %input.display(),
            chunks = chunks.len(),
            max_chars = self.limits.max_chars(),
            max_bytes = self.limits.max_bytes(),
            "splitting file"
        );

        let mut written = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            let path = output_dir.join(part_file_name(input, idx + 1));
            fs::write(&path, chunk.text).map_err(|err| Error::io("write", &path, err))?;
            written.push(path);
        }
        Ok(written)
    }
}

fn parent_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub(super) fn part_file_name(input: &Path, number: usize) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem}_part{number}{suffix}")
}
