pub mod capture;
pub mod config;
pub mod model;
pub mod recording;
pub mod store;
pub mod transcribe;

pub use capture::{AudioCapture, AudioFrame, CaptureError, WavFileCapture};
pub use config::Config;
pub use model::{
    RecordingSession, Segment, SessionStatus, Transcription, TranscriptionStatus,
};
pub use recording::{
    FixedStorageProbe, RecorderConfig, RecorderError, RecorderState, RecordingController,
    RecordingQuality, SegmentClock, StorageProbe,
};
pub use store::{MemoryStore, SegmentStore, StoreError};
pub use transcribe::{
    ExponentialBackoff, HttpTranscriptionClient, JobStatus, LocalCommandTranscriber,
    LocalTranscriber, OfflineQueue, OrchestratorConfig, RetryPolicy, TranscribeError,
    TranscriptionClient, TranscriptionOrchestrator,
};
