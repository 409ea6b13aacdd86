//! Collaborator interfaces for the video platform and speech-to-text, plus
//! request-scoped channel and video values with memoized metadata.

mod speech;
mod ytdlp;

pub use speech::CommandSpeechToText;
pub use ytdlp::YtDlp;

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use thiserror::Error;

use crate::error::Result;
use crate::types::{CaptionSegment, ChannelInfo, VideoInfo};
use crate::util::{safe_file_name, truncate_chars};

const MAX_TITLE_CHARS: usize = 100;

/// Enumerates channels and describes videos.
pub trait VideoSource {
    fn channel_info(&self, channel_url: &str) -> Result<ChannelInfo>;

    /// Video ids of the channel, newest first as listed by the platform.
    fn list_videos(&self, channel: &ChannelInfo) -> Result<Vec<String>>;

    fn video_info(&self, video_id: &str) -> Result<VideoInfo>;
}

/// Why a caption track could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptionError {
    #[error("transcripts are disabled for this video")]
    Disabled,
    #[error("no transcript found for this video")]
    NotFound,
    #[error("{0}")]
    Failed(String),
}

pub trait TranscriptSource {
    fn fetch_captions(&self, video_id: &str) -> std::result::Result<Vec<CaptionSegment>, CaptionError>;
}

pub trait AudioSource {
    /// Download the audio track into `dest_dir`, returning the file written,
    /// or `None` when no attempt produced a file.
    fn download_audio(&self, video_id: &str, dest_dir: &Path) -> Result<Option<PathBuf>>;
}

pub trait SpeechToText {
    fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// A channel locator whose platform metadata is fetched on first use.
pub struct Channel<'s> {
    url: String,
    source: &'s dyn VideoSource,
    info: OnceCell<ChannelInfo>,
}

impl<'s> Channel<'s> {
    pub fn new(url: impl Into<String>, source: &'s dyn VideoSource) -> Self {
        Self {
            url: url.into(),
            source,
            info: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn info(&self) -> Result<&ChannelInfo> {
        self.info.get_or_try_init(|| self.source.channel_info(&self.url))
    }

    pub fn name(&self) -> Result<&str> {
        Ok(self.info()?.name.as_str())
    }
}

/// A single video whose metadata is fetched on first use.
pub struct Video<'s> {
    id: String,
    source: &'s dyn VideoSource,
    info: OnceCell<VideoInfo>,
}

impl<'s> Video<'s> {
    pub fn new(id: impl Into<String>, source: &'s dyn VideoSource) -> Self {
        Self {
            id: id.into(),
            source,
            info: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> String {
        watch_url(&self.id)
    }

    /// Metadata with the title made safe for paths.
    pub fn info(&self) -> Result<&VideoInfo> {
        self.info.get_or_try_init(|| {
            let mut info = self.source.video_info(&self.id)?;
            info.title = sanitize_title(&info.title);
            Ok(info)
        })
    }

    pub fn title(&self) -> Result<&str> {
        Ok(self.info()?.title.as_str())
    }

    pub fn is_live(&self) -> Result<bool> {
        Ok(self.info()?.is_live)
    }

    pub fn is_unavailable(&self) -> Result<bool> {
        Ok(self.info()?.is_unavailable)
    }

    pub fn published_date(&self) -> Result<Option<&str>> {
        Ok(self.info()?.published_date.as_deref())
    }

    /// File-system friendly title, falling back to `video_<id>`.
    pub fn safe_title(&self) -> Result<String> {
        let safe = safe_file_name(self.title()?);
        if safe.is_empty() {
            Ok(format!("video_{}", self.id))
        } else {
            Ok(truncate_chars(&safe, MAX_TITLE_CHARS).to_string())
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Platform titles with path separators replaced, clipped to 100 characters.
fn sanitize_title(raw: &str) -> String {
    let replaced = raw.replace(['/', '\\'], "-");
    truncate_chars(&replaced, MAX_TITLE_CHARS).to_string()
}
