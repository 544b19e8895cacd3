use super::{SegmentStore, StoreError};
use crate::model::{RecordingSession, Segment, Transcription, TranscriptionStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory `SegmentStore` used by the CLI and by tests.
///
/// Serializes all access through one mutex, which also makes it the single
/// point where the completed-wins rule is enforced against racing writers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<Uuid, RecordingSession>,
    /// Segment id -> owning session id, for in-place transcription updates.
    segment_index: HashMap<Uuid, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn insert_session(&self, session: &RecordingSession) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        for seg in &session.segments {
            inner.segment_index.insert(seg.id, session.id);
        }
        inner
            .sessions
            .entry(session.id)
            .or_insert_with(|| session.clone());
        Ok(())
    }

    async fn insert_segment(&self, segment: &Segment) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .sessions
            .get_mut(&segment.session_id)
            .ok_or_else(|| {
                StoreError::Persistence(format!(
                    "no session {} for segment {}",
                    segment.session_id, segment.id
                ))
            })?;

        if !session.segments.iter().any(|s| s.id == segment.id) {
            session.segments.push(segment.clone());
        }
        inner.segment_index.insert(segment.id, segment.session_id);
        Ok(())
    }

    async fn insert_or_update_transcription(
        &self,
        segment_id: Uuid,
        transcription: &Transcription,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let session_id = *inner
            .segment_index
            .get(&segment_id)
            .ok_or(StoreError::UnknownSegment(segment_id))?;

        let segment = inner
            .sessions
            .get_mut(&session_id)
            .and_then(|s| s.segments.iter_mut().find(|seg| seg.id == segment_id))
            .ok_or(StoreError::UnknownSegment(segment_id))?;

        // Completed is terminal: the first completed write wins over anything
        // that arrives later, including a racing `failed`.
        if let Some(existing) = &segment.transcription {
            if existing.status == TranscriptionStatus::Completed {
                return Ok(());
            }
        }
        segment.transcription = Some(transcription.clone());
        Ok(())
    }

    async fn transcription_for(
        &self,
        segment_id: Uuid,
    ) -> Result<Option<Transcription>, StoreError> {
        let inner = self.inner.lock().await;
        let Some(session_id) = inner.segment_index.get(&segment_id) else {
            return Ok(None);
        };
        Ok(inner
            .sessions
            .get(session_id)
            .and_then(|s| s.segments.iter().find(|seg| seg.id == segment_id))
            .and_then(|seg| seg.transcription.clone()))
    }

    async fn segments_with_status(
        &self,
        status: TranscriptionStatus,
    ) -> Result<Vec<Segment>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sessions
            .values()
            .flat_map(|s| s.segments.iter())
            .filter(|seg| seg.status() == status)
            .cloned()
            .collect())
    }

    async fn session(&self, session_id: Uuid) -> Result<Option<RecordingSession>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.sessions.get(&session_id).cloned())
    }

    async fn save(&self) -> Result<(), StoreError> {
        // Nothing buffered; writes are applied in place.
        Ok(())
    }
}
