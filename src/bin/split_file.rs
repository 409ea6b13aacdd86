use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use yt_transcript::cli::SplitFileCli;
use yt_transcript::config::init_tracing;
use yt_transcript::splitter::FileSplitter;

fn main() -> ExitCode {
    init_tracing("warn");
    let args = SplitFileCli::parse();
    println!("Splitting file: {}", args.file_path.display());
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error splitting file: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &SplitFileCli) -> Result<()> {
    let limits = args.limits.to_limits()?;
    let written = FileSplitter::new(limits).split_file(&args.file_path, args.output_dir.as_deref())?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
