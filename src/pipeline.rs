//! Sequential channel run: list videos, fetch or reuse transcripts, fall back
//! to audio transcription, then merge and optionally split the document.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::assembly::{Document, OutputFormat};
use crate::audio::AudioStore;
use crate::config::{AppConfig, SplitLimits};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::sources::{AudioSource, Channel, SpeechToText, TranscriptSource, Video, VideoSource};
use crate::splitter::FileSplitter;
use crate::transcript::TranscriptStore;
use crate::types::{TranscriptOutcome, TranscriptRecord};

/// External services used by a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'s> {
    pub videos: &'s dyn VideoSource,
    pub captions: &'s dyn TranscriptSource,
    pub audio: &'s dyn AudioSource,
    pub speech: &'s dyn SpeechToText,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub channel_url: String,
    pub download_audio: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<String>,
    /// Split the merged document with these limits when set.
    pub split: Option<SplitLimits>,
    pub retry: RetryPolicy,
}

impl RunOptions {
    pub fn new(channel_url: impl Into<String>) -> Self {
        Self {
            channel_url: channel_url.into(),
            download_audio: false,
            output_format: OutputFormat::default(),
            output_file: None,
            split: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-outcome counters. Videos whose captions were missing but whose audio
/// was downloaded move from `disabled`/`not_found` to the `_with_audio` counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub success: usize,
    pub skipped: usize,
    pub disabled: usize,
    pub disabled_with_audio: usize,
    pub not_found: usize,
    pub not_found_with_audio: usize,
    pub live: usize,
    pub unavailable: usize,
    pub error: usize,
}

impl RunStats {
    pub fn record(&mut self, outcome: &TranscriptOutcome) {
        let counter = match outcome {
            TranscriptOutcome::Success(_) => &mut self.success,
            TranscriptOutcome::Skipped(_) => &mut self.skipped,
            TranscriptOutcome::Disabled => &mut self.disabled,
            TranscriptOutcome::NotFound => &mut self.not_found,
            TranscriptOutcome::Live => &mut self.live,
            TranscriptOutcome::Unavailable => &mut self.unavailable,
            TranscriptOutcome::Error(_) => &mut self.error,
        };
        *counter += 1;
    }

    fn audio_recovered(&mut self, outcome: &TranscriptOutcome) {
        match outcome {
            TranscriptOutcome::Disabled => {
                self.disabled -= 1;
                self.disabled_with_audio += 1;
            }
            TranscriptOutcome::NotFound => {
                self.not_found -= 1;
                self.not_found_with_audio += 1;
            }
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.success
            + self.skipped
            + self.disabled
            + self.disabled_with_audio
            + self.not_found
            + self.not_found_with_audio
            + self.live
            + self.unavailable
            + self.error
    }

    /// Human-readable download summary.
    pub fn summary_lines(&self, audio_enabled: bool) -> Vec<String> {
        let mut lines = vec![
            format!("- Successfully downloaded transcripts: {}", self.success),
            format!("- Skipped (already exists): {}", self.skipped),
            format!("- Live events skipped: {}", self.live),
            format!("- Unavailable videos: {}", self.unavailable),
        ];
        if audio_enabled {
            lines.push(format!(
                "- Transcripts disabled (audio downloaded): {}",
                self.disabled_with_audio
            ));
            lines.push(format!(
                "- No transcript found (audio downloaded): {}",
                self.not_found_with_audio
            ));
        }
        lines.push(format!("- Transcripts disabled: {}", self.disabled));
        lines.push(format!("- No transcript found: {}", self.not_found));
        lines.push(format!("- Errors: {}", self.error));
        lines
    }
}

/// A video that could not be processed; the run continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedVideo {
    pub video_id: String,
    pub error: String,
}

impl FailedVideo {
    fn new(video: &Video<'_>, error: &Error) -> Self {
        Self {
            video_id: video.id().to_string(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub channel_id: String,
    pub channel_name: String,
    pub video_count: usize,
    pub stats: RunStats,
    pub failed: Vec<FailedVideo>,
    pub audio_transcribed: usize,
    /// Merged document, absent when no transcript was available.
    pub document: Option<PathBuf>,
    pub parts: Vec<PathBuf>,
    pub elapsed: Duration,
}

pub struct ChannelRun<'s> {
    config: &'s AppConfig,
    sources: Collaborators<'s>,
    options: RunOptions,
}

impl<'s> ChannelRun<'s> {
    pub fn new(config: &'s AppConfig, sources: Collaborators<'s>, options: RunOptions) -> Self {
        Self {
            config,
            sources,
            options,
        }
    }

    pub fn execute(&self) -> Result<RunReport> {
        let started = Instant::now();
        let retry = self.options.retry;
        let channel = Channel::new(self.options.channel_url.as_str(), self.sources.videos);
        let channel_info = retry.run("fetch channel info", |_| channel.info())?;
        info!(channel_id = %channel_info.id, name = %channel_info.name, "processing channel");

        let video_ids = retry.run("list channel videos", |_| {
            self.sources.videos.list_videos(channel_info)
        })?;
        if video_ids.is_empty() {
            return Err(Error::VideoFetch(format!(
                "no videos found for {}",
                self.options.channel_url
            )));
        }
        info!(count = video_ids.len(), "found videos to process");

        let store = TranscriptStore::open(
            &self.config.transcripts_dir,
            &self.options.channel_url,
            self.sources.captions,
        )?;
        let audio = AudioStore::new(self.config, self.sources.audio, self.sources.speech, retry);

        let mut stats = RunStats::default();
        let mut failed = Vec::new();
        let mut records = Vec::new();
        let videos: Vec<Video<'_>> = video_ids
            .iter()
            .map(|id| Video::new(id.as_str(), self.sources.videos))
            .collect();

        let total = videos.len();
        let loop_started = Instant::now();
        for (index, video) in videos.iter().enumerate() {
            let position = index + 1;
            let elapsed = loop_started.elapsed();
            info!(
                video_id = video.id(),
                position,
                total,
                elapsed = %format_duration(elapsed),
                remaining = %format_duration(estimate_remaining(elapsed, position, total)),
                "processing video"
            );

            // Cached videos need no metadata; others get it with retries.
            let metadata = if store.is_cached(video.id()) {
                Ok(())
            } else {
                retry.run("fetch video info", |_| video.info()).map(|_| ())
            };
            let outcome = match metadata.and_then(|()| store.download(video)) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(video_id = video.id(), error = %err, "skipping video");
                    stats.error += 1;
                    failed.push(FailedVideo::new(video, &err));
                    continue;
                }
            };
            stats.record(&outcome);

            if self.options.download_audio && outcome.wants_audio_fallback() {
                info!(video_id = video.id(), status = outcome.label(), "attempting audio download");
                match audio.download(video) {
                    Ok(true) => stats.audio_recovered(&outcome),
                    Ok(false) => info!(video_id = video.id(), "no audio available"),
                    Err(err) => {
                        warn!(video_id = video.id(), error = %err, "audio download failed");
                        failed.push(FailedVideo::new(video, &err));
                    }
                }
            }

            if let Some(record) = outcome.into_record() {
                records.push(record);
            }
        }

        let mut audio_transcribed = 0;
        if self.options.download_audio {
            for video in &videos {
                let captioned = records
                    .iter()
                    .any(|record| record.video_id == video.id() && !record.transcript.is_empty());
                let already_failed = failed.iter().any(|failure| failure.video_id == video.id());
                if captioned || already_failed {
                    continue;
                }
                match self.audio_record(&audio, video) {
                    Ok(Some(record)) => {
                        audio_transcribed += 1;
                        merge_audio_record(&mut records, record);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(video_id = video.id(), error = %err, "audio transcription failed");
                        failed.push(FailedVideo::new(video, &err));
                    }
                }
            }
            info!(count = audio_transcribed, "audio files transcribed");
        }

        let document = if records.is_empty() {
            warn!("no transcripts to merge");
            None
        } else {
            let document = Document {
                channel_name: &channel_info.name,
                channel_url: &self.options.channel_url,
                records: &records,
            };
            Some(document.write_to(
                &self.config.output_root,
                self.options.output_format,
                self.options.output_file.as_deref(),
            )?)
        };

        let parts = match (&document, self.options.split) {
            (Some(path), Some(limits)) => FileSplitter::new(limits).split_file(path, None)?,
            _ => Vec::new(),
        };

        Ok(RunReport {
            channel_id: channel_info.id.clone(),
            channel_name: channel_info.name.clone(),
            video_count: total,
            stats,
            failed,
            audio_transcribed,
            document,
            parts,
            elapsed: started.elapsed(),
        })
    }

    fn audio_record(&self, audio: &AudioStore<'_>, video: &Video<'_>) -> Result<Option<TranscriptRecord>> {
        let Some(text) = audio.transcribe(video.id())? else {
            return Ok(None);
        };
        let info = video.info()?;
        Ok(Some(TranscriptRecord::from_audio(video.id(), info, text)))
    }
}

/// Replace the caption-less cache entry of the same video, or append.
fn merge_audio_record(records: &mut Vec<TranscriptRecord>, record: TranscriptRecord) {
    let existing = records
        .iter_mut()
        .find(|existing| existing.video_id == record.video_id && existing.transcript.is_empty());
    match existing {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

fn estimate_remaining(elapsed: Duration, position: usize, total: usize) -> Duration {
    if position <= 1 {
        return Duration::ZERO;
    }
    let per_video = elapsed / position as u32;
    per_video * (total - position) as u32
}

/// `H:MM:SS`, truncated to whole seconds.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
