pub mod wav;

pub use wav::WavFileCapture;

use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture permission denied")]
    PermissionDenied,

    #[error("capture device error: {0}")]
    Device(String),
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Audio capture boundary.
///
/// The recorder never touches capture hardware directly; platform backends
/// implement this trait and feed frames through a channel. `start` is the
/// point where capture permission is requested and denied.
#[async_trait::async_trait]
pub trait AudioCapture: Send + Sync {
    /// Begin capturing; returns the frame stream.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and release the device.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
