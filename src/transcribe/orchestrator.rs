use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    JobStatus, LocalTranscriber, OfflineQueue, RetryPolicy, TranscribeError, TranscriptionClient,
};
use crate::model::{Segment, Transcription, TranscriptionStatus};
use crate::store::SegmentStore;

/// Tuning for the remote polling loop.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Sleep between job-status polls.
    pub poll_interval: Duration,
    /// Polls allowed per job before the attempt counts as failed. Bounds a
    /// pathological remote service that never reaches a terminal status.
    pub poll_budget: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            poll_budget: 150,
        }
    }
}

/// Top-level transcription coordinator.
///
/// Decision tree per segment: offline → queue; otherwise remote with bounded
/// retries and exponential backoff; on exhaustion a single local fallback;
/// outcomes are written back through the store and never propagated to the
/// caller. Each submission runs as an independent task; duplicate submissions
/// are tolerated because a completed transcription is never overwritten.
#[derive(Clone)]
pub struct TranscriptionOrchestrator {
    store: Arc<dyn SegmentStore>,
    client: Arc<dyn TranscriptionClient>,
    local: Arc<dyn LocalTranscriber>,
    retry: Arc<dyn RetryPolicy>,
    queue: Arc<OfflineQueue>,
    config: OrchestratorConfig,
}

impl TranscriptionOrchestrator {
    pub fn new(
        store: Arc<dyn SegmentStore>,
        client: Arc<dyn TranscriptionClient>,
        local: Arc<dyn LocalTranscriber>,
        retry: Arc<dyn RetryPolicy>,
        queue: Arc<OfflineQueue>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            client,
            local,
            retry,
            queue,
            config,
        }
    }

    pub fn offline_queue(&self) -> &Arc<OfflineQueue> {
        &self.queue
    }

    /// Fire-and-forget entry point: spawns the decision tree for one segment.
    pub fn submit(&self, segment: Segment) {
        let this = self.clone();
        tokio::spawn(async move {
            this.transcribe(segment).await;
        });
    }

    /// Register this orchestrator as the offline queue's consumer, so queued
    /// segments are resubmitted when connectivity returns.
    pub async fn attach_queue_consumer(&self) {
        let this = self.clone();
        self.queue
            .set_consumer(Arc::new(move |segment| {
                let this = this.clone();
                tokio::spawn(async move {
                    this.transcribe(segment).await;
                });
            }))
            .await;
    }

    /// Route stored pending segments back through the pipeline, e.g. after a
    /// restart interrupted their transcription.
    pub async fn recover_pending(&self) {
        match self.store.segments_with_status(TranscriptionStatus::Pending).await {
            Ok(segments) => {
                if !segments.is_empty() {
                    info!("Recovering {} pending segments", segments.len());
                }
                for segment in segments {
                    self.submit(segment);
                }
            }
            Err(e) => warn!("Failed to fetch pending segments: {e}"),
        }
    }

    /// Run the full decision tree for one segment to completion.
    ///
    /// Never returns an error: every outcome lands in the store as a terminal
    /// transcription status (or the segment lands in the offline queue).
    pub async fn transcribe(&self, segment: Segment) {
        if !self.queue.is_connected().await {
            self.ensure_pending(segment.id).await;
            self.queue.enqueue(segment).await;
            return;
        }

        // Duplicate submissions (e.g. stop() resubmitting the whole session)
        // must leave a completed transcription untouched.
        if self.status_of(segment.id).await == TranscriptionStatus::Completed {
            debug!("Segment {} already transcribed; skipping", segment.id);
            return;
        }

        self.ensure_pending(segment.id).await;

        let max_attempts = self.retry.max_attempts();
        for attempt in 1..=max_attempts {
            info!(
                "Remote transcription attempt {attempt}/{max_attempts} for segment {}",
                segment.id
            );

            match self.remote_attempt(&segment).await {
                Ok(text) => {
                    info!("Remote transcription succeeded for segment {}", segment.id);
                    self.apply_completed(segment.id, text).await;
                    return;
                }
                Err(e) => {
                    warn!(
                        "Remote transcription failed (attempt {attempt}) for segment {}: {e}",
                        segment.id
                    );
                    self.record_attempt(segment.id, attempt).await;

                    if attempt < max_attempts {
                        tokio::time::sleep(self.retry.delay(attempt)).await;
                    }
                }
            }
        }

        info!("Falling back to local transcription for segment {}", segment.id);
        match self.local.recognize(&segment.audio_path).await {
            Ok(text) => {
                info!("Local transcription succeeded for segment {}", segment.id);
                self.apply_completed(segment.id, text).await;
            }
            Err(e) => {
                error!("Local transcription failed for segment {}: {e}", segment.id);
                self.mark_failed(segment.id).await;
            }
        }
    }

    /// One remote attempt: upload → create job → poll to a terminal status.
    async fn remote_attempt(&self, segment: &Segment) -> Result<String, TranscribeError> {
        let upload_url = self.client.upload(&segment.audio_path).await?;
        let job_id = self.client.create_job(&upload_url).await?;
        self.record_remote_id(segment.id, &job_id).await;
        self.poll_to_completion(&job_id).await
    }

    async fn poll_to_completion(&self, job_id: &str) -> Result<String, TranscribeError> {
        let mut polls = 0u32;
        loop {
            match self.client.poll_status(job_id).await? {
                JobStatus::Completed { text } => return Ok(text),
                JobStatus::Error { message } => return Err(TranscribeError::Api(message)),
                JobStatus::Queued | JobStatus::Processing => {
                    polls += 1;
                    if polls >= self.config.poll_budget {
                        return Err(TranscribeError::PollFailed(format!(
                            "job {job_id} not terminal after {polls} polls"
                        )));
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
            }
        }
    }

    async fn status_of(&self, segment_id: Uuid) -> TranscriptionStatus {
        match self.store.transcription_for(segment_id).await {
            Ok(Some(t)) => t.status,
            Ok(None) => TranscriptionStatus::Pending,
            Err(e) => {
                warn!("Failed to read transcription for {segment_id}: {e}");
                TranscriptionStatus::Pending
            }
        }
    }

    /// Create a pending record if the segment has none yet.
    async fn ensure_pending(&self, segment_id: Uuid) {
        match self.store.transcription_for(segment_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.write(segment_id, Transcription::pending()).await;
            }
            Err(e) => warn!("Failed to read transcription for {segment_id}: {e}"),
        }
    }

    /// Write `completed` with the returned text. No-op if another writer got
    /// there first: completed is terminal.
    async fn apply_completed(&self, segment_id: Uuid, text: String) {
        let mut transcription = self.existing_or_pending(segment_id).await;
        if transcription.status == TranscriptionStatus::Completed {
            return;
        }
        transcription.status = TranscriptionStatus::Completed;
        transcription.text = text;
        transcription.updated_at = Utc::now();
        self.write(segment_id, transcription).await;
    }

    /// Write `failed`. Completed always wins if both would apply.
    async fn mark_failed(&self, segment_id: Uuid) {
        let mut transcription = self.existing_or_pending(segment_id).await;
        if transcription.status == TranscriptionStatus::Completed {
            return;
        }
        transcription.status = TranscriptionStatus::Failed;
        transcription.text = String::new();
        transcription.updated_at = Utc::now();
        self.write(segment_id, transcription).await;
    }

    async fn record_attempt(&self, segment_id: Uuid, attempt: u32) {
        let mut transcription = self.existing_or_pending(segment_id).await;
        if transcription.status.is_terminal() {
            return;
        }
        transcription.retry_count = attempt;
        transcription.updated_at = Utc::now();
        self.write(segment_id, transcription).await;
    }

    async fn record_remote_id(&self, segment_id: Uuid, job_id: &str) {
        let mut transcription = self.existing_or_pending(segment_id).await;
        if transcription.status.is_terminal() {
            return;
        }
        transcription.remote_id = Some(job_id.to_string());
        transcription.updated_at = Utc::now();
        self.write(segment_id, transcription).await;
    }

    async fn existing_or_pending(&self, segment_id: Uuid) -> Transcription {
        match self.store.transcription_for(segment_id).await {
            Ok(Some(t)) => t,
            Ok(None) => Transcription::pending(),
            Err(e) => {
                warn!("Failed to read transcription for {segment_id}: {e}");
                Transcription::pending()
            }
        }
    }

    /// Best-effort persistence; failures are logged, never raised.
    async fn write(&self, segment_id: Uuid, transcription: Transcription) {
        if let Err(e) = self
            .store
            .insert_or_update_transcription(segment_id, &transcription)
            .await
        {
            warn!("Failed to persist transcription for {segment_id}: {e}");
        }
        if let Err(e) = self.store.save().await {
            warn!("Failed to flush store: {e}");
        }
    }
}
