use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser};

use crate::assembly::OutputFormat;
use crate::config::{SplitLimits, DEFAULT_MAX_CHARS, DEFAULT_MAX_SIZE_MB};
use crate::pipeline::RunOptions;
use crate::retry::{Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Size ceilings for split output files.
#[derive(Args, Debug, Clone, Copy)]
pub struct LimitArgs {
    /// Maximum characters per output file
    #[arg(long = "max-chars", default_value_t = DEFAULT_MAX_CHARS as i64, allow_negative_numbers = true)]
    pub max_chars: i64,
    /// Maximum size per output file in megabytes
    #[arg(long = "max-size-mb", default_value_t = DEFAULT_MAX_SIZE_MB as i64, allow_negative_numbers = true)]
    pub max_size_mb: i64,
}

impl LimitArgs {
    pub fn to_limits(&self) -> crate::error::Result<SplitLimits> {
        SplitLimits::from_megabytes(self.max_chars, self.max_size_mb)
    }
}

/// Split a large text file into parts that respect size limits, keeping
/// `##` / `<h2>` sections together where possible.
#[derive(Parser, Debug)]
#[command(name = "split-file", version)]
pub struct SplitFileCli {
    /// Path to the file to split
    #[arg(value_name = "FILE_PATH")]
    pub file_path: PathBuf,
    /// Directory for the part files (defaults to the input's directory)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Download every transcript of a YouTube channel and merge them into one
/// document.
#[derive(Parser, Debug)]
#[command(name = "yt-transcript", version)]
pub struct TranscriptCli {
    /// URL of the YouTube channel
    #[arg(value_name = "CHANNEL_URL")]
    pub channel_url: String,
    /// Download and transcribe audio when transcripts are unavailable
    #[arg(long)]
    pub audio: bool,
    /// Path to a cookies file (Netscape format)
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,
    #[arg(long = "output-format", value_enum, default_value_t = OutputFormat::Markdown)]
    pub output_format: OutputFormat,
    /// Output file name without extension
    #[arg(long = "output-file", value_name = "NAME")]
    pub output_file: Option<String>,
    /// Root directory for cached transcripts, audio and the merged document
    #[arg(long = "output-root", value_name = "DIR")]
    pub output_root: Option<PathBuf>,
    /// Split the merged document into parts
    #[arg(long)]
    pub split: bool,
    #[command(flatten)]
    pub limits: LimitArgs,
    /// Attempts for each call to the video platform
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub retries: u32,
    /// Seconds to wait between attempts
    #[arg(long = "retry-delay-secs", default_value_t = 5)]
    pub retry_delay_secs: u64,
}

impl TranscriptCli {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.channel_url.trim().is_empty(),
            "Channel URL must not be empty"
        );
        if let Some(name) = &self.output_file {
            ensure!(
                !name.contains(['/', '\\']),
                "Output file name must not contain path separators: {name}"
            );
        }
        if let Some(root) = &self.output_root {
            ensure!(
                !root.exists() || root.is_dir(),
                "Output root must be a directory: {:?}",
                root
            );
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let backoff = Backoff::Fixed(Duration::from_secs(self.retry_delay_secs));
        RetryPolicy::new(self.retries, backoff).context("Invalid retry settings")
    }

    pub fn run_options(&self) -> Result<RunOptions> {
        let split = if self.split {
            Some(self.limits.to_limits().context("Invalid split limits")?)
        } else {
            None
        };
        Ok(RunOptions {
            channel_url: self.channel_url.clone(),
            download_audio: self.audio,
            output_format: self.output_format,
            output_file: self.output_file.clone(),
            split,
            retry: self.retry_policy()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn split_file_defaults() {
        let cli = SplitFileCli::try_parse_from(["split-file", "big.md"]).unwrap();
        assert_eq!(cli.file_path, PathBuf::from("big.md"));
        assert_eq!(cli.output_dir, None);
        let limits = cli.limits.to_limits().unwrap();
        assert_eq!(limits.max_chars(), 500_000);
        assert_eq!(limits.max_bytes(), 200 * 1024 * 1024);
    }

    #[test]
    fn negative_limits_parse_but_fail_validation() {
        let cli = SplitFileCli::try_parse_from(["split-file", "big.md", "--max-chars", "-5"]).unwrap();
        assert_eq!(cli.limits.max_chars, -5);
        assert!(cli.limits.to_limits().is_err());
    }

    #[test]
    fn transcript_cli_builds_run_options() {
        let cli = TranscriptCli::try_parse_from([
            "yt-transcript",
            "https://www.youtube.com/@rust",
            "--audio",
            "--output-format",
            "html",
            "--split",
            "--max-chars",
            "1000",
            "--retries",
            "1",
        ])
        .unwrap();
        cli.validate().unwrap();
        let options = cli.run_options().unwrap();
        assert!(options.download_audio);
        assert_eq!(options.output_format, OutputFormat::Html);
        assert_eq!(options.split.map(|limits| limits.max_chars()), Some(1000));
        assert_eq!(options.retry.max_attempts(), 1);
    }

    #[test]
    fn transcript_cli_rejects_bad_settings() {
        let zero_retries =
            TranscriptCli::try_parse_from(["yt-transcript", "https://x/@a", "--retries", "0"]).unwrap();
        assert!(zero_retries.run_options().is_err());

        let bad_name =
            TranscriptCli::try_parse_from(["yt-transcript", "https://x/@a", "--output-file", "a/b"]).unwrap();
        assert!(bad_name.validate().is_err());

        let unsplit =
            TranscriptCli::try_parse_from(["yt-transcript", "https://x/@a", "--max-chars", "0"]).unwrap();
        assert_eq!(unsplit.run_options().unwrap().split, None);
    }
}
