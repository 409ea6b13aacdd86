//! Harvest the transcripts of a YouTube channel into one document and split
//! large documents into size-bounded, section-preserving parts.

pub mod assembly;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod sources;
pub mod splitter;
pub mod transcript;
pub mod types;

mod util;

pub use error::{Error, Result};
