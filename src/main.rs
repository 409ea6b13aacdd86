use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use yt_transcript::cli::TranscriptCli;
use yt_transcript::config::{init_tracing, resolve_cookies, AppConfig};
use yt_transcript::pipeline::{format_duration, ChannelRun, Collaborators, RunReport};
use yt_transcript::sources::{CommandSpeechToText, YtDlp};

fn main() -> ExitCode {
    init_tracing("info");
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\nError: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = TranscriptCli::parse();
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let options = args.run_options()?;

    let cookies = resolve_cookies(args.cookies.as_deref());
    if cookies.is_none() {
        println!("No cookies provided. You may encounter 'Sign in to confirm you're not a bot' errors.");
    }
    let config = AppConfig::from_override(args.output_root.clone())
        .context("Failed to prepare output directories")?
        .with_cookies(cookies);

    let yt_dlp = YtDlp::new(&config.tools);
    let speech = CommandSpeechToText::new(&config.tools)?;
    let sources = Collaborators {
        videos: &yt_dlp,
        captions: &yt_dlp,
        audio: &yt_dlp,
        speech: &speech,
    };

    println!("Processing channel: {}", options.channel_url);
    let report = ChannelRun::new(&config, sources, options)
        .execute()
        .context("Channel run failed")?;
    print_report(&report, args.audio);
    Ok(())
}

fn print_report(report: &RunReport, audio_enabled: bool) {
    println!("\nChannel Info:");
    println!("- ID: {}", report.channel_id);
    println!("- Name: {}", report.channel_name);
    println!("\nProcessed {} videos", report.video_count);

    println!("\nDownload summary:");
    for line in report.stats.summary_lines(audio_enabled) {
        println!("{line}");
    }
    if audio_enabled {
        println!("Successfully transcribed {} audio files", report.audio_transcribed);
    }
    if !report.failed.is_empty() {
        println!("\nFailed videos:");
        for failure in &report.failed {
            println!("- {}: {}", failure.video_id, failure.error);
        }
    }

    match &report.document {
        Some(path) => println!("\nTranscripts merged into: {}", path.display()),
        None => println!("\nNo transcripts to merge"),
    }
    for part in &report.parts {
        println!("{}", part.display());
    }
    println!("\nTotal execution time: {}", format_duration(report.elapsed));
}
