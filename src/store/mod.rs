//! Durable repository boundary for sessions, segments and transcriptions.
//!
//! Every call is best-effort from the recorder's point of view: persistence
//! failures are logged by callers and never abort an in-progress recording or
//! transcription.

mod memory;

pub use memory::MemoryStore;

use crate::model::{RecordingSession, Segment, Transcription, TranscriptionStatus};
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("unknown segment: {0}")]
    UnknownSegment(Uuid),
}

/// Repository for recording data.
///
/// Sessions grow append-only; transcriptions are updated in place. The store
/// must accept out-of-order transcription completion and enforce that a
/// completed transcription is never overwritten.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    async fn insert_session(&self, session: &RecordingSession) -> Result<(), StoreError>;

    async fn insert_segment(&self, segment: &Segment) -> Result<(), StoreError>;

    /// Create or replace the transcription of a segment. A write against a
    /// segment whose transcription is already completed is a no-op.
    async fn insert_or_update_transcription(
        &self,
        segment_id: Uuid,
        transcription: &Transcription,
    ) -> Result<(), StoreError>;

    async fn transcription_for(&self, segment_id: Uuid)
        -> Result<Option<Transcription>, StoreError>;

    async fn segments_with_status(
        &self,
        status: TranscriptionStatus,
    ) -> Result<Vec<Segment>, StoreError>;

    async fn session(&self, session_id: Uuid) -> Result<Option<RecordingSession>, StoreError>;

    /// Flush buffered writes. Best-effort; callers log failures.
    async fn save(&self) -> Result<(), StoreError>;
}
