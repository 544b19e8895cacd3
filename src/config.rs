use anyhow::Result;
use serde::Deserialize;

use crate::recording::RecordingQuality;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recording: RecordingFileConfig,
    pub transcription: TranscriptionConfig,
    pub local: LocalRecognizerConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordingFileConfig {
    pub output_dir: String,
    #[serde(default = "default_segment_secs")]
    pub segment_secs: u64,
    #[serde(default = "default_quality")]
    pub quality: RecordingQuality,
    #[serde(default = "default_min_free_gb")]
    pub min_free_gb: f64,
    #[serde(default = "default_storage_poll_secs")]
    pub storage_poll_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    #[serde(default = "default_poll_budget")]
    pub poll_budget: u32,
}

#[derive(Debug, Deserialize)]
pub struct LocalRecognizerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_segment_secs() -> u64 {
    30
}

fn default_quality() -> RecordingQuality {
    RecordingQuality::High
}

fn default_min_free_gb() -> f64 {
    1.0
}

fn default_storage_poll_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_poll_secs() -> u64 {
    2
}

fn default_poll_budget() -> u32 {
    150
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
