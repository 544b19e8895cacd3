//! Recording session control: segment cutting, persistence, and handoff to
//! the transcription pipeline.

mod clock;
mod controller;
mod segmenter;

pub use clock::SegmentClock;
pub use controller::{RecorderState, RecordingController};
pub use segmenter::Segmenter;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::CaptureError;

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("capture permission denied")]
    PermissionDenied,

    #[error("insufficient storage: {available_gb:.2} GB free, {required_gb:.2} GB required")]
    StorageExhausted { available_gb: f64, required_gb: f64 },

    #[error("capture error: {0}")]
    Capture(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid recorder state: {0}")]
    InvalidState(&'static str),
}

impl From<CaptureError> for RecorderError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied => RecorderError::PermissionDenied,
            CaptureError::Device(msg) => RecorderError::Capture(msg),
        }
    }
}

/// Recording quality tier, mapped to the segment file sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingQuality {
    Low,
    Medium,
    High,
}

impl RecordingQuality {
    pub fn sample_rate(self) -> u32 {
        match self {
            Self::Low => 12_000,
            Self::Medium => 24_000,
            Self::High => 44_100,
        }
    }
}

/// Configuration for the recording controller.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory segment WAV files are written into.
    pub output_dir: PathBuf,
    /// Fixed segment length; a cut fires each time this much active recording
    /// time accumulates. Default 30 seconds.
    pub segment_interval: Duration,
    pub quality: RecordingQuality,
    /// Free-space floor below which recording refuses to start (and stops).
    pub min_free_bytes: u64,
    /// How often free space is re-checked while recording.
    pub storage_poll: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("recordings"),
            segment_interval: Duration::from_secs(30),
            quality: RecordingQuality::High,
            min_free_bytes: 1024 * 1024 * 1024, // 1 GB
            storage_poll: Duration::from_secs(30),
        }
    }
}

/// Free-space probe boundary.
///
/// Platform-specific probing lives behind this trait; the controller only
/// compares the reported figure against the configured floor.
pub trait StorageProbe: Send + Sync {
    fn available_bytes(&self, path: &Path) -> std::io::Result<u64>;
}

/// Probe reporting a fixed figure. Stands in where no platform probe is
/// wired up, and drives the storage-exhaustion paths in tests.
pub struct FixedStorageProbe(pub u64);

impl StorageProbe for FixedStorageProbe {
    fn available_bytes(&self, _path: &Path) -> std::io::Result<u64> {
        Ok(self.0)
    }
}
