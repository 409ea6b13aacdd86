//! Audio fallback for videos without captions: download the audio track and
//! transcribe it, caching both on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::sources::{AudioSource, SpeechToText, Video};

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "m4a", "webm", "opus"];

pub struct AudioStore<'s> {
    audio_dir: PathBuf,
    transcripts_dir: PathBuf,
    source: &'s dyn AudioSource,
    speech: &'s dyn SpeechToText,
    retry: RetryPolicy,
}

impl<'s> AudioStore<'s> {
    pub fn new(
        config: &AppConfig,
        source: &'s dyn AudioSource,
        speech: &'s dyn SpeechToText,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            audio_dir: config.audio_dir.clone(),
            transcripts_dir: config.audio_transcripts_dir.clone(),
            source,
            speech,
            retry,
        }
    }

    pub fn transcript_path(&self, video_id: &str) -> PathBuf {
        self.transcripts_dir.join(format!("{video_id}.txt"))
    }

    /// Audio file already downloaded for `video_id`, preferring mp3.
    pub fn cached_audio(&self, video_id: &str) -> Option<PathBuf> {
        AUDIO_EXTENSIONS
            .iter()
            .map(|ext| self.audio_dir.join(format!("{video_id}.{ext}")))
            .find(|path| path.is_file())
    }

    /// Make sure the audio of `video` is on disk. Returns `false` for live or
    /// unavailable videos and when the download produced nothing.
    pub fn download(&self, video: &Video<'_>) -> Result<bool> {
        if self.cached_audio(video.id()).is_some() {
            debug!(video_id = video.id(), "audio already downloaded");
            return Ok(true);
        }
        if video.is_live()? || video.is_unavailable()? {
            return Ok(false);
        }
        match self.source.download_audio(video.id(), &self.audio_dir)? {
            Some(path) => {
                info!(video_id = video.id(), path = %path.display(), "audio downloaded");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Transcription of the downloaded audio, produced on first call and read
    /// back from disk afterwards. `None` when no audio exists.
    pub fn transcribe(&self, video_id: &str) -> Result<Option<String>> {
        let path = self.transcript_path(video_id);
        if path.is_file() {
            return read_text(&path).map(Some);
        }
        let Some(audio) = self.cached_audio(video_id) else {
            return Ok(None);
        };

        let text = self
            .retry
            .run("transcribe audio", |_| self.speech.transcribe(&audio))?;
        fs::write(&path, &text).map_err(|err| Error::io("write", &path, err))?;
        info!(video_id, chars = text.chars().count(), "audio transcribed");
        Ok(Some(text))
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| Error::io("read", path, err))
}
