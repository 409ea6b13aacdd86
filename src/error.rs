use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenient alias for results returned by library modules.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error getting channel info: {0}")]
    ChannelInfo(String),

    #[error("failed to fetch videos: {0}")]
    VideoFetch(String),

    #[error("error getting info for video {video_id}: {message}")]
    InvalidVideo { video_id: String, message: String },

    #[error("audio download failed: {0}")]
    AudioDownload(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("output error: {0}")]
    Output(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
