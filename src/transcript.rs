//! On-disk transcript cache, one JSON file per video grouped by channel.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::sources::{CaptionError, TranscriptSource, Video};
use crate::types::{TranscriptOutcome, TranscriptRecord, VideoInfo};
use crate::util::channel_handle;

/// Persisted in place of a transcript when none could be fetched, so later
/// runs skip the video.
#[derive(Debug, Serialize)]
struct ErrorEntry<'a> {
    title: &'a str,
    video_id: &'a str,
    error: &'a str,
    published_date: Option<&'a str>,
}

pub struct TranscriptStore<'s> {
    channel_dir: PathBuf,
    source: &'s dyn TranscriptSource,
}

impl<'s> TranscriptStore<'s> {
    /// Store for one channel under `transcripts_dir/<handle>`.
    pub fn open(transcripts_dir: &Path, channel_url: &str, source: &'s dyn TranscriptSource) -> Result<Self> {
        let channel_dir = transcripts_dir.join(channel_handle(channel_url));
        fs::create_dir_all(&channel_dir).map_err(|err| Error::io("create directory", &channel_dir, err))?;
        Ok(Self { channel_dir, source })
    }

    pub fn path_for(&self, video_id: &str) -> PathBuf {
        self.channel_dir.join(format!("{video_id}.json"))
    }

    /// A cache entry (transcript or error) exists for `video_id`.
    pub fn is_cached(&self, video_id: &str) -> bool {
        self.path_for(video_id).exists()
    }

    /// Fetch the transcript of `video` unless a cache entry already exists.
    pub fn download(&self, video: &Video<'_>) -> Result<TranscriptOutcome> {
        let path = self.path_for(video.id());
        if self.is_cached(video.id()) {
            return Ok(TranscriptOutcome::Skipped(read_cached(&path)));
        }

        let info = video.info()?;
        if info.is_live {
            self.write_error(video.id(), info, "live_event")?;
            return Ok(TranscriptOutcome::Live);
        }
        if info.is_unavailable {
            self.write_error(video.id(), info, "video_unavailable")?;
            return Ok(TranscriptOutcome::Unavailable);
        }

        match self.source.fetch_captions(video.id()) {
            Ok(segments) => {
                let record = TranscriptRecord::new(video.id(), info, segments);
                self.write_record(&path, &record)?;
                Ok(TranscriptOutcome::Success(record))
            }
            Err(CaptionError::Disabled) => {
                self.write_error(video.id(), info, "transcripts_disabled")?;
                Ok(TranscriptOutcome::Disabled)
            }
            Err(CaptionError::NotFound) => {
                self.write_error(video.id(), info, "no_transcript_found")?;
                Ok(TranscriptOutcome::NotFound)
            }
            Err(CaptionError::Failed(message)) => {
                self.write_error(video.id(), info, &message)?;
                Ok(TranscriptOutcome::Error(message))
            }
        }
    }

    fn write_record(&self, path: &Path, record: &TranscriptRecord) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(record)?;
        fs::write(&tmp, body).map_err(|err| Error::io("write", &tmp, err))?;
        fs::rename(&tmp, path).map_err(|err| Error::io("rename", &tmp, err))?;
        debug!(path = %path.display(), "transcript saved");
        Ok(())
    }

    fn write_error(&self, video_id: &str, info: &VideoInfo, error: &str) -> Result<()> {
        let path = self.path_for(video_id);
        let entry = ErrorEntry {
            title: &info.title,
            video_id,
            error,
            published_date: info.published_date.as_deref(),
        };
        let body = serde_json::to_string(&entry)?;
        fs::write(&path, body).map_err(|err| Error::io("write", &path, err))
    }
}

fn read_cached(path: &Path) -> Option<TranscriptRecord> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable cache entry");
            None
        }
    }
}
