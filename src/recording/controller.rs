use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::segmenter::Segmenter;
use super::{RecorderConfig, RecorderError, StorageProbe};
use crate::capture::AudioCapture;
use crate::model::{RecordingSession, Segment};
use crate::store::SegmentStore;
use crate::transcribe::TranscriptionOrchestrator;

/// Recorder lifecycle: `Idle → Recording ⇄ Paused → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

enum Command {
    Pause,
    Resume,
    Stop,
}

/// Sequences segment creation and closing for one recording session.
///
/// Owns the capture backend for the lifetime of the recording; all frame
/// processing (including the cut critical section) happens on a single
/// spawned task that the control methods talk to through a command channel.
pub struct RecordingController {
    config: RecorderConfig,
    store: Arc<dyn SegmentStore>,
    orchestrator: Arc<TranscriptionOrchestrator>,
    storage: Arc<dyn StorageProbe>,
    state: RecorderState,
    session_id: Option<Uuid>,
    capture: Option<Box<dyn AudioCapture>>,
    cmd_tx: Option<mpsc::Sender<Command>>,
    task: Option<JoinHandle<Vec<Segment>>>,
}

impl RecordingController {
    pub fn new(
        config: RecorderConfig,
        store: Arc<dyn SegmentStore>,
        orchestrator: Arc<TranscriptionOrchestrator>,
        storage: Arc<dyn StorageProbe>,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
            storage,
            state: RecorderState::Idle,
            session_id: None,
            capture: None,
            cmd_tx: None,
            task: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Start recording: permission and free-space preflight, session
    /// creation, segment #1, then the frame-processing task.
    pub async fn start(
        &mut self,
        mut capture: Box<dyn AudioCapture>,
    ) -> Result<Uuid, RecorderError> {
        if self.state != RecorderState::Idle {
            return Err(RecorderError::InvalidState(
                "recording already started or stopped",
            ));
        }

        self.check_storage_floor()?;

        // Permission is requested by the capture backend at start.
        let mut frames = capture.start().await?;

        let session = RecordingSession::new();
        info!("Starting recording session {}", session.id);

        if let Err(e) = self.store.insert_session(&session).await {
            warn!("Failed to persist new session {}: {e}", session.id);
        }
        if let Err(e) = self.store.save().await {
            warn!("Failed to flush store: {e}");
        }

        let mut segmenter = Segmenter::new(
            self.config.clone(),
            session.id,
            session.started_at,
            Arc::clone(&self.store),
            Arc::clone(&self.orchestrator),
        )
        .map_err(|e| RecorderError::Storage(format!("{e:#}")))?;

        segmenter
            .open_first_segment(0)
            .map_err(|e| RecorderError::Storage(format!("{e:#}")))?;

        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(8);
        let storage = Arc::clone(&self.storage);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let mut storage_timer = tokio::time::interval(config.storage_poll);
            storage_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of an interval fires immediately.
            storage_timer.tick().await;

            // Everything the segmenter's clock sees is in frame time, so the
            // trailing segment's duration shares a time base with its cuts.
            let mut last_frame_ms = 0u64;

            loop {
                tokio::select! {
                    biased;

                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(Command::Pause) => {
                                info!("Recording paused");
                                segmenter.pause(last_frame_ms);
                            }
                            Some(Command::Resume) => {
                                info!("Recording resumed");
                                segmenter.resume(last_frame_ms);
                            }
                            Some(Command::Stop) | None => break,
                        }
                    }

                    _ = storage_timer.tick() => {
                        match storage.available_bytes(&config.output_dir) {
                            Ok(avail) if avail < config.min_free_bytes => {
                                error!(
                                    "Free space critically low ({avail} bytes); stopping recording"
                                );
                                break;
                            }
                            Ok(_) => {}
                            Err(e) => warn!("Storage probe failed: {e}"),
                        }
                    }

                    frame = frames.recv() => {
                        match frame {
                            Some(frame) => {
                                last_frame_ms = frame.timestamp_ms;
                                if let Err(e) = segmenter.handle_frame(frame).await {
                                    warn!("Failed to process audio frame: {e:#}");
                                }
                            }
                            None => break,
                        }
                    }
                }
            }

            segmenter.finish(last_frame_ms).await
        });

        self.session_id = Some(session.id);
        self.capture = Some(capture);
        self.cmd_tx = Some(cmd_tx);
        self.task = Some(task);
        self.state = RecorderState::Recording;

        Ok(session.id)
    }

    /// Mute the writer without closing the current segment.
    pub async fn pause(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::InvalidState("not recording"));
        }
        self.send(Command::Pause).await?;
        self.state = RecorderState::Paused;
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Paused {
            return Err(RecorderError::InvalidState("not paused"));
        }
        self.send(Command::Resume).await?;
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Stop recording: the trailing segment is closed (even at zero duration)
    /// and every segment of the session is resubmitted for transcription.
    /// Terminal; in-flight transcriptions are left to complete.
    pub async fn stop(&mut self) -> Result<Vec<Segment>, RecorderError> {
        if !matches!(self.state, RecorderState::Recording | RecorderState::Paused) {
            return Err(RecorderError::InvalidState("not recording"));
        }

        // The task may already have exited (stream ended, storage low); a
        // closed channel here is fine.
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Stop).await;
        }

        let segments = match self.task.take() {
            Some(task) => match task.await {
                Ok(segments) => segments,
                Err(e) => {
                    error!("Frame task panicked: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.stop().await {
                warn!("Failed to stop capture backend: {e}");
            }
        }

        self.state = RecorderState::Stopped;
        info!("Recording stopped with {} segments", segments.len());

        Ok(segments)
    }

    fn check_storage_floor(&self) -> Result<(), RecorderError> {
        match self.storage.available_bytes(&self.config.output_dir) {
            Ok(avail) if avail < self.config.min_free_bytes => {
                Err(RecorderError::StorageExhausted {
                    available_gb: avail as f64 / 1e9,
                    required_gb: self.config.min_free_bytes as f64 / 1e9,
                })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                // A failing probe must not block recording.
                warn!("Storage probe failed during preflight: {e}");
                Ok(())
            }
        }
    }

    async fn send(&self, cmd: Command) -> Result<(), RecorderError> {
        match &self.cmd_tx {
            Some(tx) => tx
                .send(cmd)
                .await
                .map_err(|_| RecorderError::InvalidState("frame task stopped")),
            None => Err(RecorderError::InvalidState("not started")),
        }
    }
}
