use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use segscribe::{
    Config, ExponentialBackoff, FixedStorageProbe, HttpTranscriptionClient,
    LocalCommandTranscriber, MemoryStore, OfflineQueue, OrchestratorConfig, RecorderConfig,
    RecordingController, SegmentStore, TranscriptionOrchestrator, WavFileCapture,
};

/// Record a WAV file in fixed-length segments and transcribe each one.
#[derive(Parser, Debug)]
#[command(name = "segscribe", version)]
struct Cli {
    /// Config file (without extension), as understood by the config crate
    #[arg(long, default_value = "config/segscribe")]
    config: String,

    /// WAV file replayed as the capture source
    #[arg(long)]
    input: PathBuf,

    /// Seconds to record before stopping
    #[arg(long, default_value_t = 70)]
    duration_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("Failed to load config")?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(OfflineQueue::new(true));

    let orchestrator = TranscriptionOrchestrator::new(
        store.clone(),
        Arc::new(HttpTranscriptionClient::new(
            &cfg.transcription.base_url,
            &cfg.transcription.api_key,
        )?),
        Arc::new(LocalCommandTranscriber::new(
            &cfg.local.command,
            cfg.local.args.clone(),
        )),
        Arc::new(ExponentialBackoff {
            max_attempts: cfg.transcription.max_retries,
            ..Default::default()
        }),
        queue,
        OrchestratorConfig {
            poll_interval: Duration::from_secs(cfg.transcription.poll_secs),
            poll_budget: cfg.transcription.poll_budget,
        },
    );

    orchestrator.attach_queue_consumer().await;
    orchestrator.recover_pending().await;

    let recorder_config = RecorderConfig {
        output_dir: PathBuf::from(&cfg.recording.output_dir),
        segment_interval: Duration::from_secs(cfg.recording.segment_secs),
        quality: cfg.recording.quality,
        min_free_bytes: (cfg.recording.min_free_gb * 1e9) as u64,
        storage_poll: Duration::from_secs(cfg.recording.storage_poll_secs),
    };

    let mut controller = RecordingController::new(
        recorder_config,
        store.clone(),
        Arc::new(orchestrator),
        Arc::new(FixedStorageProbe(u64::MAX)),
    );

    let session_id = controller
        .start(Box::new(WavFileCapture::new(&cli.input)))
        .await?;

    info!("Recording for {}s...", cli.duration_secs);
    tokio::time::sleep(Duration::from_secs(cli.duration_secs)).await;

    let segments = controller.stop().await?;
    info!("Recorded {} segments; waiting for transcriptions", segments.len());

    // In-flight transcriptions finish on their own schedule; give them a
    // moment, then report whatever state the session reached.
    tokio::time::sleep(Duration::from_secs(5)).await;

    if let Some(session) = store.session(session_id).await? {
        println!("Session {}", session.id);
        println!("  duration: {:.1}s", session.total_duration());
        println!("  status:   {}", session.transcription_status());
        println!("  text:     {}", session.full_transcription_text());
    }

    Ok(())
}
