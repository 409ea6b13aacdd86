mod limits;
mod logging;

pub use limits::{SplitLimits, DEFAULT_MAX_CHARS, DEFAULT_MAX_SIZE_MB};
pub use logging::init_tracing;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};

const DEFAULT_WHISPER_MODEL: &str = "./models/ggml-base.en.bin";
const DEFAULT_SUB_LANGS: &str = "en.*,en";
const DEFAULT_COOKIES_FILE: &str = "cookies.txt";

/// Directory layout and external tool locations for a channel run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_root: PathBuf,
    pub transcripts_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub audio_transcripts_dir: PathBuf,
    pub tools: ToolConfig,
}

/// Programs invoked by the concrete collaborators.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
    /// Speech-to-text command template; `{input}` is replaced by the WAV path.
    pub stt_command: String,
    pub subtitle_langs: String,
    pub cookies: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve the layout under `path` (or the working directory), creating
    /// the directories as needed.
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        let root = match path {
            Some(custom) => custom,
            None => std::env::current_dir()
                .map_err(|err| Error::io("resolve", ".", err))?,
        };
        let output_root = ensure_dir(&root)?;
        let transcripts_dir = ensure_dir(&output_root.join("output"))?;
        let audio_dir = ensure_dir(&output_root.join("audio_files"))?;
        let audio_transcripts_dir = ensure_dir(&output_root.join("audio_transcripts"))?;
        Ok(Self {
            output_root,
            transcripts_dir,
            audio_dir,
            audio_transcripts_dir,
            tools: ToolConfig::from_env(),
        })
    }

    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.tools.cookies = cookies;
        self
    }
}

impl ToolConfig {
    pub fn from_env() -> Self {
        let model = env_or("WHISPER_MODEL_PATH", DEFAULT_WHISPER_MODEL);
        Self {
            yt_dlp: PathBuf::from(env_or("YT_DLP_PATH", "yt-dlp")),
            ffmpeg: PathBuf::from(env_or("FFMPEG_PATH", "ffmpeg")),
            stt_command: std::env::var("YT_TRANSCRIPT_STT_CMD")
                .unwrap_or_else(|_| format!("whisper-cli -nt -np -m {model} -f {{input}}")),
            subtitle_langs: env_or("YT_TRANSCRIPT_SUB_LANGS", DEFAULT_SUB_LANGS),
            cookies: None,
        }
    }
}

/// Pick the cookies file handed to the video platform tools.
///
/// An explicit file wins when it exists; otherwise `cookies.txt` in the
/// working directory is used if present.
pub fn resolve_cookies(explicit: Option<&Path>) -> Option<PathBuf> {
    resolve_cookies_in(explicit, Path::new("."))
}

fn resolve_cookies_in(explicit: Option<&Path>, workdir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            info!(path = %path.display(), "using cookies file");
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "cookies file not found; ignoring");
    }
    let fallback = workdir.join(DEFAULT_COOKIES_FILE);
    if fallback.is_file() {
        info!(path = %fallback.display(), "using default cookies file");
        return Some(fallback);
    }
    None
}

fn ensure_dir(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|err| Error::io("create directory", path, err))?;
    let canonical = path
        .canonicalize()
        .map_err(|err| Error::io("resolve directory", path, err))?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(Error::config(format!(
            "path {} is not a directory",
            canonical.display()
        )))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
