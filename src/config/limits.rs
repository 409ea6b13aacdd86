use crate::error::{Error, Result};

/// Default character ceiling per output file.
pub const DEFAULT_MAX_CHARS: usize = 500_000;

/// Default size ceiling per output file, in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 200;

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Size ceilings applied to every chunk produced by the splitter.
///
/// Both limits are strictly positive; construction fails before any scanning
/// happens otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLimits {
    max_chars: usize,
    max_bytes: usize,
}

impl SplitLimits {
    pub fn new(max_chars: usize, max_bytes: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(Error::config("max_chars must be positive"));
        }
        if max_bytes == 0 {
            return Err(Error::config("max_bytes must be positive"));
        }
        Ok(Self {
            max_chars,
            max_bytes,
        })
    }

    /// Build limits from signed user input, converting megabytes to bytes.
    pub fn from_megabytes(max_chars: i64, max_size_mb: i64) -> Result<Self> {
        if max_chars <= 0 {
            return Err(Error::config(format!(
                "max_chars must be positive, got {max_chars}"
            )));
        }
        if max_size_mb <= 0 {
            return Err(Error::config(format!(
                "max_size_mb must be positive, got {max_size_mb}"
            )));
        }
        let max_bytes = (max_size_mb as u64)
            .checked_mul(BYTES_PER_MEGABYTE)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| Error::config(format!("max_size_mb {max_size_mb} is too large")))?;
        let max_chars = usize::try_from(max_chars)
            .map_err(|_| Error::config(format!("max_chars {max_chars} is too large")))?;
        Self::new(max_chars, max_bytes)
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// True when a unit of the given size fits inside a single chunk.
    pub fn admits(&self, chars: usize, bytes: usize) -> bool {
        chars <= self.max_chars && bytes <= self.max_bytes
    }

    /// Width, in characters, of a forced fixed-width slice.
    ///
    /// Half the byte ceiling is used as a character estimate, so slices of
    /// multi-byte text can still exceed `max_bytes`.
    pub fn slice_width(&self) -> usize {
        self.max_chars.min(self.max_bytes / 2).max(1)
    }
}

impl Default for SplitLimits {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_bytes: DEFAULT_MAX_SIZE_MB as usize * BYTES_PER_MEGABYTE as usize,
        }
    }
}
