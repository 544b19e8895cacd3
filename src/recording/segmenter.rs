use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{RecorderConfig, SegmentClock};
use crate::capture::AudioFrame;
use crate::model::Segment;
use crate::store::SegmentStore;
use crate::transcribe::TranscriptionOrchestrator;

/// Splits an incoming frame stream into fixed-length WAV segments and hands
/// each closed segment to the transcription orchestrator.
///
/// Owned by exactly one task: a cut (finalize old file, persist, submit, open
/// new file) runs to completion before the next frame is examined, so the
/// writer can never receive frames for a closed segment.
pub struct Segmenter {
    config: RecorderConfig,
    session_id: Uuid,
    session_started: DateTime<Utc>,
    clock: SegmentClock,
    store: Arc<dyn SegmentStore>,
    orchestrator: Arc<TranscriptionOrchestrator>,
    current: Option<OpenSegment>,
    closed: Vec<Segment>,
    segment_index: usize,
    muted: bool,
}

struct OpenSegment {
    id: Uuid,
    start_time: DateTime<Utc>,
    path: PathBuf,
    writer: SegmentWriter,
}

impl Segmenter {
    pub fn new(
        config: RecorderConfig,
        session_id: Uuid,
        session_started: DateTime<Utc>,
        store: Arc<dyn SegmentStore>,
        orchestrator: Arc<TranscriptionOrchestrator>,
    ) -> Result<Self> {
        fs::create_dir_all(&config.output_dir).context("Failed to create output directory")?;

        let clock = SegmentClock::new(config.segment_interval, 0);

        Ok(Self {
            config,
            session_id,
            session_started,
            clock,
            store,
            orchestrator,
            current: None,
            closed: Vec::new(),
            segment_index: 0,
            muted: false,
        })
    }

    pub fn is_paused(&self) -> bool {
        self.muted
    }

    pub fn segments_closed(&self) -> usize {
        self.closed.len()
    }

    /// Open segment #1. Called once, before the first frame arrives.
    pub fn open_first_segment(&mut self, now_ms: u64) -> Result<()> {
        self.clock.begin_segment(now_ms);
        self.open_segment(now_ms)?;
        Ok(())
    }

    /// Write one frame into the active segment and cut when the interval is
    /// reached. Frames arriving while paused are dropped.
    pub async fn handle_frame(&mut self, frame: AudioFrame) -> Result<()> {
        if self.muted {
            return Ok(());
        }

        if let Some(open) = &mut self.current {
            open.writer.write_frame(&frame)?;
        }

        if self.clock.should_cut(frame.timestamp_ms) {
            self.cut(frame.timestamp_ms).await;
        }

        Ok(())
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.muted = true;
        self.clock.pause(now_ms);
    }

    pub fn resume(&mut self, now_ms: u64) {
        self.muted = false;
        self.clock.resume(now_ms);
    }

    /// Close the current segment, persist it, submit it, and immediately open
    /// the next one so no frames fall into a gap.
    async fn cut(&mut self, now_ms: u64) {
        let segment = self.close_current(now_ms);

        if let Some(segment) = segment {
            info!(
                "Segment {} closed: {:.1}s of audio",
                segment.id, segment.duration_secs
            );
            self.persist_segment(&segment).await;
            self.orchestrator.submit(segment.clone());
            self.closed.push(segment);
        }

        self.clock.begin_segment(now_ms);
        if let Err(e) = self.open_segment(now_ms) {
            warn!("Failed to open next segment: {e:#}");
        }
    }

    /// Close the trailing segment (zero duration allowed), persist it, and
    /// resubmit every segment of the session. Resubmission reconciles any
    /// segment whose earlier handoff was lost; completed ones are skipped by
    /// the orchestrator.
    pub async fn finish(&mut self, now_ms: u64) -> Vec<Segment> {
        if let Some(segment) = self.close_current(now_ms) {
            self.persist_segment(&segment).await;
            self.closed.push(segment);
        }

        for segment in &self.closed {
            self.orchestrator.submit(segment.clone());
        }

        info!(
            "Session {} finished with {} segments",
            self.session_id,
            self.closed.len()
        );

        self.closed.clone()
    }

    fn close_current(&mut self, now_ms: u64) -> Option<Segment> {
        let open = self.current.take()?;

        if let Err(e) = open.writer.finish() {
            warn!("Failed to finalize segment file {:?}: {e:#}", open.path);
        }

        let duration_secs = self.clock.elapsed_active_ms(now_ms) as f64 / 1000.0;

        Some(Segment {
            id: open.id,
            session_id: self.session_id,
            start_time: open.start_time,
            duration_secs,
            audio_path: open.path,
            transcription: None,
        })
    }

    fn open_segment(&mut self, now_ms: u64) -> Result<()> {
        let path = self.config.output_dir.join(format!(
            "{}-seg-{:03}.wav",
            self.session_id, self.segment_index
        ));
        self.segment_index += 1;

        let writer = SegmentWriter::create(&path, self.config.quality.sample_rate())?;

        self.current = Some(OpenSegment {
            id: Uuid::new_v4(),
            start_time: self.session_started + ChronoDuration::milliseconds(now_ms as i64),
            path,
            writer,
        });

        Ok(())
    }

    /// Best-effort persistence: a failed write is logged and recording goes on.
    async fn persist_segment(&self, segment: &Segment) {
        if let Err(e) = self.store.insert_segment(segment).await {
            warn!("Failed to persist segment {}: {e}", segment.id);
        }
        if let Err(e) = self.store.save().await {
            warn!("Failed to flush store: {e}");
        }
    }
}

/// Writes one segment to disk as a WAV file.
struct SegmentWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
}

impl SegmentWriter {
    fn create(path: &PathBuf, sample_rate: u32) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {path:?}"))?;

        Ok(Self {
            writer: Some(writer),
        })
    }

    fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }
        Ok(())
    }
}

impl Drop for SegmentWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
