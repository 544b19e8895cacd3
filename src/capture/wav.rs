use super::{AudioCapture, AudioFrame, CaptureError};
use hound::WavReader;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

/// Capture backend that replays a WAV file as a live frame stream.
///
/// Used by the CLI (no platform audio stack required) and by integration
/// tests. Frames are emitted in 100 ms slices with monotonic timestamps, the
/// same shape a hardware backend produces.
pub struct WavFileCapture {
    path: PathBuf,
    frame_ms: u64,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl WavFileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frame_ms: 100,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioCapture for WavFileCapture {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let reader = WavReader::open(&self.path)
            .map_err(|e| CaptureError::Device(format!("failed to open {:?}: {e}", self.path)))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CaptureError::Device(format!("failed to read samples: {e}")))?;

        info!(
            "Replaying {:?}: {} samples, {}Hz, {} channels",
            self.path,
            samples.len(),
            spec.sample_rate,
            spec.channels
        );

        let frame_ms = self.frame_ms;
        let samples_per_frame =
            (spec.sample_rate as u64 * spec.channels as u64 * frame_ms / 1000) as usize;

        let (tx, rx) = mpsc::channel(100);
        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            for slice in samples.chunks(samples_per_frame.max(1)) {
                let frame = AudioFrame {
                    samples: slice.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
                timestamp_ms += frame_ms;
                tokio::time::sleep(std::time::Duration::from_millis(frame_ms)).await;
            }
        });
        self.task = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}
