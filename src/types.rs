//! Core types shared by the channel pipeline

use serde::{Deserialize, Serialize};

/// Identity of a channel as reported by the video source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
}

/// Per-video metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoInfo {
    pub title: String,
    /// Upload date as reported by the platform (`YYYYMMDD`)
    pub published_date: Option<String>,
    pub is_live: bool,
    pub is_unavailable: bool,
}

/// One timed line of a caption track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    pub start: f64, // seconds
}

/// Transcript of one video as stored on disk and merged into the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub title: String,
    pub video_id: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub transcript: Vec<CaptionSegment>,
}

impl TranscriptRecord {
    pub fn new(video_id: &str, info: &VideoInfo, transcript: Vec<CaptionSegment>) -> Self {
        Self {
            title: info.title.clone(),
            video_id: video_id.to_string(),
            published_date: info.published_date.clone(),
            transcript,
        }
    }

    /// Record for a speech-to-text transcription, which carries no timing.
    pub fn from_audio(video_id: &str, info: &VideoInfo, text: String) -> Self {
        Self::new(video_id, info, vec![CaptionSegment { text, start: 0.0 }])
    }

    /// Caption text joined with single spaces.
    pub fn full_text(&self) -> String {
        self.transcript
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of fetching the transcript of a single video
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    Success(TranscriptRecord),
    /// A cached entry already exists; carries the record when it holds one
    Skipped(Option<TranscriptRecord>),
    Disabled,
    NotFound,
    Live,
    Unavailable,
    Error(String),
}

impl TranscriptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TranscriptOutcome::Success(_) => "success",
            TranscriptOutcome::Skipped(_) => "skipped",
            TranscriptOutcome::Disabled => "disabled",
            TranscriptOutcome::NotFound => "not_found",
            TranscriptOutcome::Live => "live",
            TranscriptOutcome::Unavailable => "unavailable",
            TranscriptOutcome::Error(_) => "error",
        }
    }

    /// Captions are missing for reasons an audio transcription can work around
    pub fn wants_audio_fallback(&self) -> bool {
        matches!(
            self,
            TranscriptOutcome::Disabled | TranscriptOutcome::NotFound
        )
    }

    pub fn into_record(self) -> Option<TranscriptRecord> {
        match self {
            TranscriptOutcome::Success(record) => Some(record),
            TranscriptOutcome::Skipped(record) => record,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> VideoInfo {
        VideoInfo {
            title: "Intro".to_string(),
            published_date: Some("20240101".to_string()),
            ..VideoInfo::default()
        }
    }

    #[test]
    fn full_text_joins_segments() {
        let record = TranscriptRecord::new(
            "abc",
            &info(),
            vec![
                CaptionSegment {
                    text: "Hello".to_string(),
                    start: 0.0,
                },
                CaptionSegment {
                    text: "world.".to_string(),
                    start: 1.2,
                },
            ],
        );
        assert_eq!(record.full_text(), "Hello world.");
        assert_eq!(record.published_date.as_deref(), Some("20240101"));
    }

    #[test]
    fn only_missing_captions_trigger_audio_fallback() {
        assert!(TranscriptOutcome::Disabled.wants_audio_fallback());
        assert!(TranscriptOutcome::NotFound.wants_audio_fallback());
        assert!(!TranscriptOutcome::Live.wants_audio_fallback());
        assert!(!TranscriptOutcome::Error("boom".into()).wants_audio_fallback());
    }

    #[test]
    fn skipped_outcome_keeps_cached_record() {
        let record = TranscriptRecord::from_audio("abc", &info(), "Spoken text".to_string());
        let outcome = TranscriptOutcome::Skipped(Some(record.clone()));
        assert_eq!(outcome.label(), "skipped");
        assert_eq!(outcome.into_record(), Some(record));
        assert_eq!(TranscriptOutcome::Unavailable.into_record(), None);
    }

    #[test]
    fn record_deserializes_without_optional_fields() {
        let record: TranscriptRecord =
            serde_json::from_str(r#"{"title": "T", "video_id": "v"}"#).unwrap();
        assert!(record.transcript.is_empty());
        assert_eq!(record.published_date, None);
    }
}
