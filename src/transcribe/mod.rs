//! Transcription pipeline: remote client, local fallback, retry policy,
//! offline queue, and the orchestrator tying them together.
//!
//! Provider boundaries are trait-based so the orchestration logic is testable
//! against fakes and the remote service is swappable.

mod local;
mod offline;
mod orchestrator;
mod remote;
mod retry;

pub use local::LocalCommandTranscriber;
pub use offline::{OfflineQueue, QueueConsumer};
pub use orchestrator::{OrchestratorConfig, TranscriptionOrchestrator};
pub use remote::HttpTranscriptionClient;
pub use retry::{ExponentialBackoff, RetryPolicy};

use async_trait::async_trait;
use std::path::Path;

/// Errors from the transcription pipeline.
///
/// None of these reach the recording path: per-segment failures are absorbed
/// by the retry/fallback decision tree and are observable only as a persisted
/// `failed` status.
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("failed to build HTTP client: {0}")]
    ClientInit(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("transcription request failed: {0}")]
    RequestFailed(String),

    #[error("status poll failed: {0}")]
    PollFailed(String),

    #[error("remote job error: {0}")]
    Api(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("local recognition failed: {0}")]
    LocalRecognition(String),
}

/// Terminal or in-flight state of a remote transcription job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Processing,
    Completed { text: String },
    Error { message: String },
}

/// Remote transcription service protocol: upload the payload, create a job,
/// poll it. Each operation fails with a distinct error kind.
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    /// Upload raw audio; returns the service-side URL of the payload.
    async fn upload(&self, audio_path: &Path) -> Result<String, TranscribeError>;

    /// Create a transcription job for an uploaded payload; returns the job id.
    async fn create_job(&self, upload_url: &str) -> Result<String, TranscribeError>;

    /// Fetch the current status of a job. Callers poll until terminal.
    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, TranscribeError>;
}

/// On-device recognizer: one blocking-to-completion operation.
#[async_trait]
pub trait LocalTranscriber: Send + Sync {
    async fn recognize(&self, audio_path: &Path) -> Result<String, TranscribeError>;
}
