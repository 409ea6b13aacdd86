//! Merge transcript records into one Markdown or HTML document.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};
use crate::sources::watch_url;
use crate::types::TranscriptRecord;
use crate::util::safe_file_name;

const FALLBACK_FILE_NAME: &str = "YouTube_Channel";
const NO_TRANSCRIPT: &str = "No transcript available for this video.";

static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence break pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Html => "html",
        }
    }
}

/// Everything needed to render the merged document.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub channel_name: &'a str,
    pub channel_url: &'a str,
    pub records: &'a [TranscriptRecord],
}

impl Document<'_> {
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Markdown => self.render_markdown(),
            OutputFormat::Html => self.render_html(),
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = format!(
            "# Transcripts for YouTube channel: {}\n\nChannel URL: {}\n\n",
            self.channel_name, self.channel_url
        );
        for record in self.records {
            out.push_str(&format!("## {} - {}\n\n", record.title, record_url(record)));
            let text = record.full_text();
            let paragraphs = paragraphs(&text);
            if paragraphs.is_empty() {
                out.push_str(NO_TRANSCRIPT);
                out.push_str("\n\n");
            }
            for paragraph in paragraphs {
                out.push_str(paragraph);
                out.push_str("\n\n");
            }
            out.push_str("---\n\n");
        }
        out
    }

    pub fn render_html(&self) -> String {
        let name = escape_html(self.channel_name);
        let url = escape_html(self.channel_url);
        let mut out = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Transcripts for {name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }}
        h1 {{ color: #333; border-bottom: 1px solid #eee; }}
        h2 {{ color: #444; margin-top: 30px; }}
        .video-transcript {{ margin-bottom: 40px; }}
        .separator {{ border-top: 1px dashed #ccc; margin: 30px 0; }}
    </style>
</head>
<body>
    <h1>Transcripts for YouTube channel: {name}</h1>
    <p>Channel URL: <a href="{url}">{url}</a></p>
"#
        );
        for record in self.records {
            out.push_str(&format!(
                "\n    <div class=\"video-transcript\">\n        <h2><a href=\"{}\">{}</a></h2>\n",
                escape_html(&record_url(record)),
                escape_html(&record.title)
            ));
            let text = record.full_text();
            let paragraphs = paragraphs(&text);
            if paragraphs.is_empty() {
                out.push_str(&format!("        <p>{NO_TRANSCRIPT}</p>\n"));
            }
            for paragraph in paragraphs {
                out.push_str(&format!("        <p>{}</p>\n", escape_html(paragraph)));
            }
            out.push_str("    </div>\n    <div class=\"separator\"></div>\n");
        }
        out.push_str("</body>\n</html>");
        out
    }

    /// Write the rendered document into `dir`, returning the file path.
    pub fn write_to(
        &self,
        dir: &Path,
        format: OutputFormat,
        file_name: Option<&str>,
    ) -> Result<PathBuf> {
        if self.records.is_empty() {
            return Err(Error::Output("no transcripts to merge".to_string()));
        }
        let path = dir.join(output_file_name(self.channel_name, file_name, format));
        fs::write(&path, self.render(format)).map_err(|err| Error::io("write", &path, err))?;
        info!(path = %path.display(), records = self.records.len(), "merged document written");
        Ok(path)
    }
}

/// `custom` (or the sanitized channel name) plus the format's extension.
pub fn output_file_name(channel_name: &str, custom: Option<&str>, format: OutputFormat) -> String {
    let stem = match custom {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let safe = safe_file_name(channel_name);
            if safe.is_empty() {
                FALLBACK_FILE_NAME.to_string()
            } else {
                safe
            }
        }
    };
    format!("{stem}.{}", format.extension())
}

fn record_url(record: &TranscriptRecord) -> String {
    if record.video_id.is_empty() {
        String::new()
    } else {
        watch_url(&record.video_id)
    }
}

/// One paragraph per sentence, trimmed, empty pieces dropped.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for found in SENTENCE_BREAK.find_iter(text) {
        pieces.push(&text[start..found.start() + 1]);
        start = found.end();
    }
    pieces.push(&text[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
