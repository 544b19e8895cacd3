// Shared fakes for the transcription pipeline tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use segscribe::{
    JobStatus, LocalTranscriber, MemoryStore, OfflineQueue, OrchestratorConfig, RecordingSession,
    RetryPolicy, Segment, SegmentStore, TranscribeError, TranscriptionClient,
    TranscriptionOrchestrator,
};

/// What the mock's poll endpoint reports for every job.
pub enum PollScript {
    /// Job completes on the first poll.
    Complete,
    /// Job never leaves `Queued`/`Processing`.
    Stall,
    /// Job reaches the error status with this message.
    Fail(String),
}

/// Remote client whose upload step either always fails or always succeeds,
/// counting calls so tests can assert on the retry and poll budgets.
pub struct MockClient {
    pub text: Option<String>,
    pub uploads: AtomicU32,
    pub polls: AtomicU32,
    script: PollScript,
}

impl MockClient {
    pub fn succeeding(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            uploads: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            script: PollScript::Complete,
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            uploads: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            script: PollScript::Complete,
        }
    }

    /// Uploads succeed but the job never reaches a terminal status.
    pub fn stalling() -> Self {
        Self {
            text: Some("never delivered".to_string()),
            uploads: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            script: PollScript::Stall,
        }
    }

    /// Uploads succeed but the job ends in the error status.
    pub fn erroring(message: &str) -> Self {
        Self {
            text: Some("never delivered".to_string()),
            uploads: AtomicU32::new(0),
            polls: AtomicU32::new(0),
            script: PollScript::Fail(message.to_string()),
        }
    }

    pub fn upload_count(&self) -> u32 {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionClient for MockClient {
    async fn upload(&self, _audio_path: &Path) -> Result<String, TranscribeError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(_) => Ok("https://example.test/upload/1".to_string()),
            None => Err(TranscribeError::UploadFailed("HTTP 500".to_string())),
        }
    }

    async fn create_job(&self, _upload_url: &str) -> Result<String, TranscribeError> {
        Ok("job-1".to_string())
    }

    async fn poll_status(&self, _job_id: &str) -> Result<JobStatus, TranscribeError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            PollScript::Complete => Ok(JobStatus::Completed {
                text: self.text.clone().unwrap_or_default(),
            }),
            PollScript::Stall => Ok(if n % 2 == 0 {
                JobStatus::Queued
            } else {
                JobStatus::Processing
            }),
            PollScript::Fail(message) => Ok(JobStatus::Error {
                message: message.clone(),
            }),
        }
    }
}

/// Local recognizer returning a fixed transcript, or failing.
pub struct MockLocal {
    pub text: Option<String>,
    pub calls: AtomicU32,
}

impl MockLocal {
    pub fn succeeding(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalTranscriber for MockLocal {
    async fn recognize(&self, _audio_path: &Path) -> Result<String, TranscribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(TranscribeError::LocalRecognition("no speech model".to_string())),
        }
    }
}

/// Zero-delay retry policy so the full retry loop runs instantly.
pub struct ZeroDelay {
    pub attempts: u32,
}

impl RetryPolicy for ZeroDelay {
    fn max_attempts(&self) -> u32 {
        self.attempts
    }

    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Orchestrator wired to the given fakes over a fresh in-memory store.
pub fn build_orchestrator(
    store: Arc<MemoryStore>,
    client: Arc<MockClient>,
    local: Arc<MockLocal>,
    attempts: u32,
    connected: bool,
) -> (TranscriptionOrchestrator, Arc<OfflineQueue>) {
    let queue = Arc::new(OfflineQueue::new(connected));
    let orchestrator = TranscriptionOrchestrator::new(
        store,
        client,
        local,
        Arc::new(ZeroDelay { attempts }),
        queue.clone(),
        OrchestratorConfig {
            poll_interval: Duration::ZERO,
            poll_budget: 10,
        },
    );
    (orchestrator, queue)
}

/// Persist a session with one segment and return the segment.
pub async fn seed_segment(store: &MemoryStore, start_offset_secs: i64, duration_secs: f64) -> Segment {
    let mut session = RecordingSession::new();
    session.started_at = chrono::Utc::now();
    store.insert_session(&session).await.unwrap();

    let segment = Segment {
        id: uuid::Uuid::new_v4(),
        session_id: session.id,
        start_time: session.started_at + chrono::Duration::seconds(start_offset_secs),
        duration_secs,
        audio_path: PathBuf::from("/tmp/does-not-matter.wav"),
        transcription: None,
    };
    store.insert_segment(&segment).await.unwrap();
    segment
}
