use anyhow::Result;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use yt_transcript::assembly::OutputFormat;
use yt_transcript::config::{AppConfig, SplitLimits};
use yt_transcript::pipeline::{ChannelRun, Collaborators, RunOptions, RunStats};
use yt_transcript::retry::{Backoff, RetryPolicy};
use yt_transcript::sources::{AudioSource, CaptionError, SpeechToText, TranscriptSource, VideoSource};
use yt_transcript::types::{CaptionSegment, ChannelInfo, VideoInfo};
use yt_transcript::Error;

const CHANNEL_URL: &str = "https://www.youtube.com/@fixture";

/// In-memory platform: `ok*` ids have captions, `off*` have them disabled,
/// `live*` are live streams, `bad*` fail metadata lookups. The first
/// `info_failures` metadata lookups fail with a transient error.
struct FakePlatform {
    videos: Vec<&'static str>,
    listing_failures: Cell<u32>,
    info_failures: Cell<u32>,
    info_calls: Cell<usize>,
    caption_fetches: Cell<usize>,
}

impl FakePlatform {
    fn new(videos: Vec<&'static str>) -> Self {
        Self {
            videos,
            listing_failures: Cell::new(0),
            info_failures: Cell::new(0),
            info_calls: Cell::new(0),
            caption_fetches: Cell::new(0),
        }
    }
}

impl VideoSource for FakePlatform {
    fn channel_info(&self, channel_url: &str) -> yt_transcript::Result<ChannelInfo> {
        assert_eq!(channel_url, CHANNEL_URL);
        Ok(ChannelInfo {
            id: "UCfixture".to_string(),
            name: "Fixture Channel".to_string(),
        })
    }

    fn list_videos(&self, channel: &ChannelInfo) -> yt_transcript::Result<Vec<String>> {
        assert_eq!(channel.id, "UCfixture");
        if self.listing_failures.get() > 0 {
            self.listing_failures.set(self.listing_failures.get() - 1);
            return Err(Error::VideoFetch("HTTP Error 503".to_string()));
        }
        Ok(self.videos.iter().map(|id| id.to_string()).collect())
    }

    fn video_info(&self, video_id: &str) -> yt_transcript::Result<VideoInfo> {
        self.info_calls.set(self.info_calls.get() + 1);
        if self.info_failures.get() > 0 {
            self.info_failures.set(self.info_failures.get() - 1);
            return Err(Error::InvalidVideo {
                video_id: video_id.to_string(),
                message: "HTTP Error 503".to_string(),
            });
        }
        if video_id.starts_with("bad") {
            return Err(Error::InvalidVideo {
                video_id: video_id.to_string(),
                message: "Sign in to confirm you're not a bot".to_string(),
            });
        }
        Ok(VideoInfo {
            title: format!("Video {video_id}"),
            published_date: Some("20240115".to_string()),
            is_live: video_id.starts_with("live"),
            is_unavailable: false,
        })
    }
}

impl TranscriptSource for FakePlatform {
    fn fetch_captions(&self, video_id: &str) -> Result<Vec<CaptionSegment>, CaptionError> {
        self.caption_fetches.set(self.caption_fetches.get() + 1);
        if video_id.starts_with("off") {
            return Err(CaptionError::Disabled);
        }
        Ok(vec![
            CaptionSegment {
                text: format!("Captions of {video_id}."),
                start: 0.0,
            },
            CaptionSegment {
                text: "Thanks for watching!".to_string(),
                start: 2.5,
            },
        ])
    }
}

impl AudioSource for FakePlatform {
    fn download_audio(&self, video_id: &str, dest_dir: &Path) -> yt_transcript::Result<Option<PathBuf>> {
        let path = dest_dir.join(format!("{video_id}.mp3"));
        fs::write(&path, b"ID3").map_err(|err| Error::io("write", &path, err))?;
        Ok(Some(path))
    }
}

struct FakeSpeech;

impl SpeechToText for FakeSpeech {
    fn transcribe(&self, audio: &Path) -> yt_transcript::Result<String> {
        let stem = audio.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        Ok(format!("Spoken audio of {stem}."))
    }
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy::new(3, Backoff::Fixed(Duration::ZERO)).unwrap()
}

fn options() -> RunOptions {
    RunOptions {
        retry: quick_retry(),
        ..RunOptions::new(CHANNEL_URL)
    }
}

#[test]
fn run_merges_captions_and_records_outcomes() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(vec!["ok1", "off1", "live1", "bad1", "ok2"]);
    platform.listing_failures.set(2);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };

    let report = ChannelRun::new(&config, sources, options()).execute()?;

    assert_eq!(report.video_count, 5);
    assert_eq!(
        report.stats,
        RunStats {
            success: 2,
            disabled: 1,
            live: 1,
            error: 1,
            ..RunStats::default()
        }
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].video_id, "bad1");

    let document = report.document.expect("document written");
    assert_eq!(document, config.output_root.join("Fixture Channel.md"));
    let markdown = fs::read_to_string(&document)?;
    assert!(markdown.starts_with("# Transcripts for YouTube channel: Fixture Channel\n\n"));
    assert!(markdown.contains("## Video ok1 - https://www.youtube.com/watch?v=ok1\n\nCaptions of ok1.\n\nThanks for watching!\n\n"));
    assert!(markdown.contains("## Video ok2 - "));
    assert!(!markdown.contains("Video off1"));
    assert!(config.transcripts_dir.join("fixture").join("off1.json").is_file());
    assert!(report.parts.is_empty());
    Ok(())
}

#[test]
fn second_run_reuses_cache() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(vec!["ok1", "off1"]);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };

    ChannelRun::new(&config, sources, options()).execute()?;
    let fetches = platform.caption_fetches.get();
    let lookups = platform.info_calls.get();
    let report = ChannelRun::new(&config, sources, options()).execute()?;

    assert_eq!(platform.caption_fetches.get(), fetches);
    assert_eq!(platform.info_calls.get(), lookups);
    assert_eq!(report.stats.skipped, 2);
    let markdown = fs::read_to_string(report.document.expect("document written"))?;
    assert!(markdown.contains("Captions of ok1."));
    assert!(markdown.contains("## Video off1 - https://www.youtube.com/watch?v=off1\n\nNo transcript available for this video.\n\n"));
    Ok(())
}

#[test]
fn audio_fallback_fills_missing_captions() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(vec!["ok1", "off1"]);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };
    let options = RunOptions {
        download_audio: true,
        output_format: OutputFormat::Html,
        output_file: Some("merged".to_string()),
        ..options()
    };

    let report = ChannelRun::new(&config, sources, options).execute()?;

    assert_eq!(report.stats.disabled, 0);
    assert_eq!(report.stats.disabled_with_audio, 1);
    assert_eq!(report.audio_transcribed, 1);
    assert!(config.audio_dir.join("off1.mp3").is_file());
    assert!(config.audio_transcripts_dir.join("off1.txt").is_file());

    let document = report.document.expect("document written");
    assert_eq!(document.file_name().and_then(|n| n.to_str()), Some("merged.html"));
    let html = fs::read_to_string(document)?;
    assert!(html.contains("<p>Spoken audio of off1.</p>"));
    assert!(html.contains("<h2><a href=\"https://www.youtube.com/watch?v=ok1\">Video ok1</a></h2>"));
    Ok(())
}

#[test]
fn split_option_writes_parts() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(vec!["ok1", "ok2", "ok3"]);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };
    let options = RunOptions {
        split: Some(SplitLimits::new(150, 1_000_000)?),
        ..options()
    };

    let report = ChannelRun::new(&config, sources, options).execute()?;

    let document = report.document.expect("document written");
    assert!(report.parts.len() > 1);
    let rebuilt: String = report
        .parts
        .iter()
        .map(fs::read_to_string)
        .collect::<std::io::Result<_>>()?;
    assert_eq!(rebuilt, fs::read_to_string(&document)?);
    assert_eq!(
        report.parts[0],
        config.output_root.join("Fixture Channel_part1.md")
    );
    Ok(())
}

#[test]
fn transient_metadata_failure_is_retried() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(vec!["ok1"]);
    platform.info_failures.set(1);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };

    let report = ChannelRun::new(&config, sources, options()).execute()?;

    assert_eq!(report.stats.success, 1);
    assert_eq!(report.stats.error, 0);
    assert!(report.failed.is_empty());
    assert_eq!(platform.info_calls.get(), 2);
    Ok(())
}

#[test]
fn leftover_audio_does_not_duplicate_captioned_videos() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    fs::write(config.audio_dir.join("ok1.mp3"), b"ID3")?;
    let platform = FakePlatform::new(vec!["ok1"]);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };
    let options = RunOptions {
        download_audio: true,
        ..options()
    };

    let report = ChannelRun::new(&config, sources, options).execute()?;

    assert_eq!(report.audio_transcribed, 0);
    let markdown = fs::read_to_string(report.document.expect("document written"))?;
    assert_eq!(markdown.matches("## Video ok1 - ").count(), 1);
    assert!(!markdown.contains("Spoken audio of ok1"));
    Ok(())
}

#[test]
fn failed_video_is_reported_once() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    fs::write(config.audio_dir.join("bad1.mp3"), b"ID3")?;
    let platform = FakePlatform::new(vec!["ok1", "bad1"]);
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };
    let options = RunOptions {
        download_audio: true,
        ..options()
    };

    let report = ChannelRun::new(&config, sources, options).execute()?;

    let ids: Vec<&str> = report.failed.iter().map(|f| f.video_id.as_str()).collect();
    assert_eq!(ids, vec!["bad1"]);
    assert_eq!(report.stats.error, 1);
    assert!(!config.audio_transcripts_dir.join("bad1.txt").exists());
    Ok(())
}

#[test]
fn empty_channel_is_an_error() -> Result<()> {
    let temp = tempdir()?;
    let config = AppConfig::from_override(Some(temp.path().to_path_buf()))?;
    let platform = FakePlatform::new(Vec::new());
    let sources = Collaborators {
        videos: &platform,
        captions: &platform,
        audio: &platform,
        speech: &FakeSpeech,
    };

    let err = ChannelRun::new(&config, sources, options()).execute().unwrap_err();

    assert!(matches!(err, Error::VideoFetch(_)));
    Ok(())
}
