//! `yt-dlp` backed implementation of the platform collaborators.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{watch_url, AudioSource, CaptionError, TranscriptSource, VideoSource};
use crate::config::ToolConfig;
use crate::error::{Error, Result};
use crate::types::{CaptionSegment, ChannelInfo, VideoInfo};

const TOOL: &str = "yt-dlp";

/// Thin wrapper around the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    cookies: Option<PathBuf>,
    subtitle_langs: String,
}

impl YtDlp {
    pub fn new(tools: &ToolConfig) -> Self {
        Self {
            program: tools.yt_dlp.clone(),
            cookies: tools.cookies.clone(),
            subtitle_langs: tools.subtitle_langs.clone(),
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("--no-warnings").arg("--no-progress");
        if let Some(cookies) = &self.cookies {
            command.arg("--cookies").arg(cookies);
        }
        command
    }

    /// Run to completion, returning stdout on success and stderr otherwise.
    fn capture(&self, mut command: Command) -> std::result::Result<String, String> {
        debug!(tool = TOOL, command = ?command, "running external tool");
        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|err| format!("unable to run {}: {err}", self.program.display()))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            })
        }
    }
}

impl VideoSource for YtDlp {
    fn channel_info(&self, channel_url: &str) -> Result<ChannelInfo> {
        let mut command = self.command();
        command
            .arg("--flat-playlist")
            .arg("--dump-single-json")
            .arg("--playlist-end")
            .arg("1")
            .arg(channel_url);
        let stdout = self.capture(command).map_err(Error::ChannelInfo)?;
        let raw: ChannelJson = serde_json::from_str(&stdout)?;
        raw.into_info()
            .ok_or_else(|| Error::ChannelInfo(format!("no channel id reported for {channel_url}")))
    }

    fn list_videos(&self, channel: &ChannelInfo) -> Result<Vec<String>> {
        let list_url = format!("https://www.youtube.com/channel/{}/videos", channel.id);
        let mut command = self.command();
        command
            .arg("--flat-playlist")
            .arg("--get-id")
            .arg("--ignore-errors")
            .arg(&list_url);
        let stdout = self.capture(command).map_err(Error::VideoFetch)?;
        Ok(parse_id_list(&stdout))
    }

    fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let mut command = self.command();
        command
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg(watch_url(video_id));
        match self.capture(command) {
            Ok(stdout) => {
                let raw: VideoJson = serde_json::from_str(&stdout)?;
                Ok(raw.into_info())
            }
            Err(stderr) if reports_unavailable(&stderr) => Ok(VideoInfo {
                title: "unavailable".to_string(),
                is_unavailable: true,
                ..VideoInfo::default()
            }),
            Err(stderr) => Err(Error::InvalidVideo {
                video_id: video_id.to_string(),
                message: stderr,
            }),
        }
    }
}

impl TranscriptSource for YtDlp {
    fn fetch_captions(&self, video_id: &str) -> std::result::Result<Vec<CaptionSegment>, CaptionError> {
        let workdir = tempfile::tempdir()
            .map_err(|err| CaptionError::Failed(format!("unable to create temp dir: {err}")))?;
        let template = workdir.path().join("%(id)s.%(ext)s");
        let mut command = self.command();
        command
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-lang")
            .arg(&self.subtitle_langs)
            .arg("--sub-format")
            .arg("json3")
            .arg("-o")
            .arg(&template)
            .arg(watch_url(video_id));
        if let Err(stderr) = self.capture(command) {
            return Err(classify_caption_failure(&stderr));
        }

        let track = find_with_extension(workdir.path(), "json3").ok_or(CaptionError::NotFound)?;
        let raw = fs::read_to_string(&track)
            .map_err(|err| CaptionError::Failed(format!("unable to read captions: {err}")))?;
        let segments = parse_json3(&raw).map_err(|err| CaptionError::Failed(err.to_string()))?;
        if segments.is_empty() {
            return Err(CaptionError::NotFound);
        }
        Ok(segments)
    }
}

impl AudioSource for YtDlp {
    fn download_audio(&self, video_id: &str, dest_dir: &Path) -> Result<Option<PathBuf>> {
        let template = dest_dir.join(format!("{video_id}.%(ext)s"));
        let attempts: [&[&str]; 2] = [
            &["-x", "--audio-format", "mp3"],
            &["-f", "m4a/bestaudio/best"],
        ];
        for (index, format_args) in attempts.iter().enumerate() {
            let mut command = self.command();
            command
                .args(*format_args)
                .arg("-o")
                .arg(&template)
                .arg(watch_url(video_id));
            match self.capture(command) {
                Ok(_) => {
                    if let Some(path) = find_with_stem(dest_dir, video_id) {
                        return Ok(Some(path));
                    }
                    warn!(video_id, attempt = index + 1, "download finished without an audio file");
                }
                Err(stderr) if is_age_restricted(&stderr) => {
                    return Err(Error::AudioDownload(format!(
                        "video {video_id} is age restricted; a cookies file is required"
                    )));
                }
                Err(stderr) => {
                    warn!(video_id, attempt = index + 1, error = %stderr, "audio download attempt failed");
                }
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct ChannelJson {
    channel_id: Option<String>,
    id: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    title: Option<String>,
}

impl ChannelJson {
    fn into_info(self) -> Option<ChannelInfo> {
        let id = self.channel_id.or(self.id)?;
        let name = self
            .channel
            .or(self.uploader)
            .or(self.title)
            .unwrap_or_else(|| id.clone());
        Some(ChannelInfo { id, name })
    }
}

#[derive(Debug, Deserialize)]
struct VideoJson {
    title: Option<String>,
    upload_date: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
    live_status: Option<String>,
    availability: Option<String>,
}

impl VideoJson {
    fn into_info(self) -> VideoInfo {
        let is_live = self.is_live.unwrap_or(false)
            || matches!(self.live_status.as_deref(), Some("is_live" | "is_upcoming" | "live" | "upcoming"));
        let is_unavailable = matches!(
            self.availability.as_deref(),
            Some("unavailable" | "private" | "premium_only" | "subscriber_only")
        );
        VideoInfo {
            title: self.title.unwrap_or_else(|| "unknown".to_string()),
            published_date: self.upload_date,
            is_live,
            is_unavailable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Caption segments from a `json3` subtitle track. Events without text
/// (line breaks, window setup) are dropped.
pub(crate) fn parse_json3(raw: &str) -> serde_json::Result<Vec<CaptionSegment>> {
    let track: Json3Track = serde_json::from_str(raw)?;
    Ok(track
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then(|| CaptionSegment {
                text,
                start: event.start_ms as f64 / 1000.0,
            })
        })
        .collect())
}

fn parse_id_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn reports_unavailable(stderr: &str) -> bool {
    ["Video unavailable", "Private video", "This video has been removed"]
        .iter()
        .any(|marker| stderr.contains(marker))
}

fn is_age_restricted(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("confirm your age") || lower.contains("age restricted") || lower.contains("age-restricted")
}

fn classify_caption_failure(stderr: &str) -> CaptionError {
    let lower = stderr.to_lowercase();
    if lower.contains("subtitles are disabled") || lower.contains("transcripts disabled") {
        CaptionError::Disabled
    } else if lower.contains("no subtitles") || lower.contains("there are no subtitles") {
        CaptionError::NotFound
    } else {
        CaptionError::Failed(stderr.to_string())
    }
}

fn find_with_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(extension))
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn find_with_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    let prefix = format!("{stem}.");
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && !name.ends_with(".part"))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}
