use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::{JobStatus, TranscribeError, TranscriptionClient};

/// Remote transcription service client (AssemblyAI-shaped protocol).
///
/// Three atomic operations against the HTTP API:
/// `POST /v2/upload` (raw audio bytes), `POST /v2/transcript` (create job),
/// `GET /v2/transcript/{id}` (poll job).
pub struct HttpTranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    status: String,
    text: Option<String>,
    error: Option<String>,
}

impl HttpTranscriptionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, TranscribeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| TranscribeError::ClientInit(e.to_string()))?;

        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Build a client against a custom `reqwest::Client` (tests, proxies).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl TranscriptionClient for HttpTranscriptionClient {
    async fn upload(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscribeError::UploadFailed(format!("read {audio_path:?}: {e}")))?;

        debug!("Uploading {} bytes from {:?}", audio.len(), audio_path);

        let response = self
            .client
            .post(self.url("/v2/upload"))
            .header("authorization", &self.api_key)
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscribeError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranscribeError::UploadFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::UploadFailed(format!("malformed response: {e}")))?;

        Ok(body.upload_url)
    }

    async fn create_job(&self, upload_url: &str) -> Result<String, TranscribeError> {
        let response = self
            .client
            .post(self.url("/v2/transcript"))
            .header("authorization", &self.api_key)
            .json(&json!({ "audio_url": upload_url }))
            .send()
            .await
            .map_err(|e| TranscribeError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranscribeError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: CreateJobResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::RequestFailed(format!("malformed response: {e}")))?;

        Ok(body.id)
    }

    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, TranscribeError> {
        let response = self
            .client
            .get(self.url(&format!("/v2/transcript/{job_id}")))
            .header("authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscribeError::PollFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TranscribeError::PollFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: PollResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;

        match body.status.as_str() {
            "completed" => Ok(JobStatus::Completed {
                text: body.text.unwrap_or_default(),
            }),
            "error" => Ok(JobStatus::Error {
                message: body.error.unwrap_or_else(|| "unspecified".to_string()),
            }),
            "queued" | "pending" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            other => Err(TranscribeError::InvalidResponse(format!(
                "unknown job status {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructing_the_client_succeeds_and_trims_the_base_url() {
        let client = HttpTranscriptionClient::new("https://api.example.test/", "key")
            .expect("default builder settings are valid");
        assert_eq!(client.url("/v2/upload"), "https://api.example.test/v2/upload");
    }
}
