use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::info;

use super::{LocalTranscriber, TranscribeError};

/// On-device recognizer driven through an external command.
///
/// Runs `program [args..] <audio-path>` and takes stdout as the transcript.
/// Used as the fallback when the remote path is exhausted; any spawn or
/// non-zero exit maps to `LocalRecognition`.
pub struct LocalCommandTranscriber {
    program: String,
    args: Vec<String>,
}

impl LocalCommandTranscriber {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl LocalTranscriber for LocalCommandTranscriber {
    async fn recognize(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        info!("Running local recognizer {} on {:?}", self.program, audio_path);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(audio_path)
            .output()
            .await
            .map_err(|e| {
                TranscribeError::LocalRecognition(format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscribeError::LocalRecognition(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(text)
    }
}
