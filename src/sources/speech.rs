use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::SpeechToText;
use crate::config::ToolConfig;
use crate::error::{Error, Result};

const INPUT_PLACEHOLDER: &str = "{input}";
const SAMPLE_RATE: &str = "16000";

/// Speech-to-text through an external command.
///
/// The audio is first converted to 16 kHz mono WAV with ffmpeg, then the
/// configured command runs with `{input}` replaced by the WAV path. Its
/// stdout is the transcription.
#[derive(Debug, Clone)]
pub struct CommandSpeechToText {
    ffmpeg: PathBuf,
    program: String,
    args: Vec<String>,
}

impl CommandSpeechToText {
    pub fn new(tools: &ToolConfig) -> Result<Self> {
        let (program, args) = parse_template(&tools.stt_command)?;
        Ok(Self {
            ffmpeg: tools.ffmpeg.clone(),
            program,
            args,
        })
    }

    fn convert_to_wav(&self, audio: &Path, wav: &Path) -> Result<()> {
        let output = Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(audio)
            .args(["-ar", SAMPLE_RATE, "-ac", "1", "-c:a", "pcm_s16le"])
            .arg(wav)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| Error::tool("ffmpeg", err.to_string()))?;
        if !output.status.success() {
            return Err(Error::tool(
                "ffmpeg",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

impl SpeechToText for CommandSpeechToText {
    fn transcribe(&self, audio: &Path) -> Result<String> {
        let workdir = tempfile::tempdir().map_err(|err| Error::io("create temp dir in", std::env::temp_dir(), err))?;
        let wav = workdir.path().join("audio.wav");
        self.convert_to_wav(audio, &wav)?;

        let wav_arg = wav.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(INPUT_PLACEHOLDER, &wav_arg))
            .collect();
        debug!(program = %self.program, ?args, "running speech-to-text");
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| Error::Transcription(format!("unable to run {}: {err}", self.program)))?;
        if !output.status.success() {
            return Err(Error::Transcription(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = normalize_output(&String::from_utf8_lossy(&output.stdout));
        if text.is_empty() {
            return Err(Error::Transcription(format!(
                "no speech recognized in {}",
                audio.display()
            )));
        }
        Ok(text)
    }
}

/// Split a command template into program and arguments. A template without
/// `{input}` gets the path appended as the final argument.
fn parse_template(template: &str) -> Result<(String, Vec<String>)> {
    let mut parts = template.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| Error::config("speech-to-text command is empty"))?;
    let mut args: Vec<String> = parts.collect();
    if !args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
        args.push(INPUT_PLACEHOLDER.to_string());
    }
    Ok((program, args))
}

fn normalize_output(stdout: &str) -> String {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
