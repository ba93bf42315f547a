use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{GenerationError, Result};

/// Output video dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Terminal-or-not status of a provider-side video job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Provider status strings outside the known terminal set count as still processing
    fn parse(raw: &str) -> Self {
        match raw {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::Processing,
        }
    }
}

/// One parsed status-check result
#[derive(Debug, Clone)]
pub struct JobStatusReport {
    pub status: JobStatus,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
}

/// Client for the third-party avatar/video API
#[async_trait]
pub trait AvatarVideoApi: Send + Sync {
    /// Create a reusable avatar identity from a host portrait
    async fn create_avatar(&self, image_bytes: &[u8]) -> Result<String>;

    /// Submit a video-generation job pairing an avatar with a public audio URL
    async fn submit_video_job(
        &self,
        avatar_id: &str,
        audio_url: &str,
        dimensions: VideoDimensions,
    ) -> Result<String>;

    /// Query the current status of a submitted job
    async fn check_status(&self, video_id: &str) -> Result<JobStatusReport>;
}

#[derive(Debug, Serialize)]
struct CreateAvatarRequest {
    base64: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateAvatarResponse {
    data: CreateAvatarData,
}

#[derive(Debug, Deserialize)]
struct CreateAvatarData {
    avatar_id: String,
}

#[derive(Debug, Serialize)]
struct GenerateVideoRequest {
    video_inputs: Vec<VideoInput>,
    test: bool,
    dimension: Dimension,
}

#[derive(Debug, Serialize)]
struct VideoInput {
    character: Character,
    voice: Voice,
}

#[derive(Debug, Serialize)]
struct Character {
    #[serde(rename = "type")]
    kind: String,
    avatar_id: String,
    avatar_style: String,
}

#[derive(Debug, Serialize)]
struct Voice {
    #[serde(rename = "type")]
    kind: String,
    audio_url: String,
}

#[derive(Debug, Serialize)]
struct Dimension {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    data: GenerateVideoData,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoData {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoStatusResponse {
    data: VideoStatusData,
}

#[derive(Debug, Deserialize)]
struct VideoStatusData {
    status: String,
    video_url: Option<String>,
    error: Option<ProviderJobError>,
}

#[derive(Debug, Deserialize)]
struct ProviderJobError {
    message: String,
}

/// HTTP implementation of the avatar/video API client
#[derive(Debug)]
pub struct HttpAvatarVideoClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpAvatarVideoClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.base_url.is_none() {
            return Err(GenerationError::Configuration(
                "provider base URL not configured".to_string(),
            ));
        }
        if config.api_key.is_none() {
            return Err(GenerationError::Configuration(
                "provider API key not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/');
        format!("{}{}", base, path)
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl AvatarVideoApi for HttpAvatarVideoClient {
    async fn create_avatar(&self, image_bytes: &[u8]) -> Result<String> {
        // Unique name per call; repeated submissions must not collide provider-side
        let request = CreateAvatarRequest {
            base64: BASE64.encode(image_bytes),
            name: format!("podcast_host_{}", Utc::now().timestamp_millis()),
        };

        debug!("Creating avatar from {} image bytes", image_bytes.len());

        let response = self
            .client
            .post(self.endpoint("/avatar/from_image"))
            .header("x-api-key", self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::AvatarCreation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::AvatarCreation(format!(
                "avatar API error {}: {}",
                status, text
            )));
        }

        let parsed: CreateAvatarResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::AvatarCreation(e.to_string()))?;

        Ok(parsed.data.avatar_id)
    }

    async fn submit_video_job(
        &self,
        avatar_id: &str,
        audio_url: &str,
        dimensions: VideoDimensions,
    ) -> Result<String> {
        let request = GenerateVideoRequest {
            video_inputs: vec![VideoInput {
                character: Character {
                    kind: "avatar".to_string(),
                    avatar_id: avatar_id.to_string(),
                    avatar_style: "normal".to_string(),
                },
                voice: Voice {
                    kind: "audio".to_string(),
                    audio_url: audio_url.to_string(),
                },
            }],
            test: self.config.test_mode,
            dimension: Dimension {
                width: dimensions.width,
                height: dimensions.height,
            },
        };

        debug!("Submitting video job for avatar {}", avatar_id);

        let response = self
            .client
            .post(self.endpoint("/video/generate"))
            .header("x-api-key", self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::VideoSubmission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::VideoSubmission(format!(
                "video API error {}: {}",
                status, text
            )));
        }

        let parsed: GenerateVideoResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::VideoSubmission(e.to_string()))?;

        Ok(parsed.data.video_id)
    }

    async fn check_status(&self, video_id: &str) -> Result<JobStatusReport> {
        debug!("Checking status of video job {}", video_id);

        let response = self
            .client
            .get(self.endpoint("/video_status.get"))
            .header("x-api-key", self.api_key())
            .query(&[("video_id", video_id)])
            .send()
            .await
            .map_err(|e| GenerationError::StatusCheck(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::StatusCheck(format!(
                "status API error {}: {}",
                status, text
            )));
        }

        let parsed: VideoStatusResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::StatusCheck(e.to_string()))?;

        Ok(JobStatusReport {
            status: JobStatus::parse(&parsed.data.status),
            video_url: parsed.data.video_url,
            error_message: parsed.data.error.map(|e| e.message),
        })
    }
}
