//! Core entities: sessions, segments, and their transcriptions.
//!
//! A `RecordingSession` owns its segments; each segment carries at most one
//! `Transcription`, created lazily when the segment first enters the
//! transcription pipeline. Terminal transcription states are immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Lifecycle state of one segment's transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStatus {
    Pending,
    Completed,
    Failed,
}

impl TranscriptionStatus {
    /// Completed and Failed are terminal; only Completed is immutable against
    /// every later write (a Failed record may still be upgraded to Completed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Text result (or failure record) associated with one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub id: Uuid,
    pub status: TranscriptionStatus,
    /// Empty unless status is Completed.
    pub text: String,
    /// Job identifier assigned by the remote service, if any.
    pub remote_id: Option<String>,
    /// Number of remote attempts that have failed so far.
    pub retry_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl Transcription {
    pub fn pending() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: TranscriptionStatus::Pending,
            text: String::new(),
            remote_id: None,
            retry_count: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn completed(text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: TranscriptionStatus::Completed,
            text,
            remote_id: None,
            retry_count: 0,
            updated_at: Utc::now(),
        }
    }
}

/// A fixed-duration slice of one continuous recording.
///
/// Immutable once its duration is frozen at cut time, except for the
/// transcription relationship which is set once, asynchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Seconds of active recording in this segment; zero is valid.
    pub duration_secs: f64,
    /// Opaque handle to the raw audio payload; never interpreted here.
    pub audio_path: PathBuf,
    pub transcription: Option<Transcription>,
}

impl Segment {
    /// A segment without a transcription record reads as pending.
    pub fn status(&self) -> TranscriptionStatus {
        self.transcription
            .as_ref()
            .map(|t| t.status)
            .unwrap_or(TranscriptionStatus::Pending)
    }
}

/// Aggregate transcription state of a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// The full recording spanning from start to stop, composed of segments.
///
/// Segment insertion order is chronological under normal operation, but every
/// ordered read re-sorts by `start_time` since transcriptions (and therefore
/// store writes) complete out of order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub segments: Vec<Segment>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            segments: Vec::new(),
        }
    }

    /// Sum of segment durations in seconds.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }

    /// Failed if any segment failed, Completed if all completed and the
    /// session is non-empty, otherwise In Progress.
    pub fn transcription_status(&self) -> SessionStatus {
        if self
            .segments
            .iter()
            .any(|s| s.status() == TranscriptionStatus::Failed)
        {
            SessionStatus::Failed
        } else if !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|s| s.status() == TranscriptionStatus::Completed)
        {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        }
    }

    /// Completed texts only, in `start_time` order, joined with spaces.
    pub fn full_transcription_text(&self) -> String {
        let mut ordered: Vec<&Segment> = self.segments.iter().collect();
        ordered.sort_by(|a, b| a.start_time.cmp(&b.start_time));

        ordered
            .iter()
            .filter_map(|s| match &s.transcription {
                Some(t) if t.status == TranscriptionStatus::Completed => Some(t.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
