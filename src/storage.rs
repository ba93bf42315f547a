use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{GenerationError, Result};

/// A temporarily public object created for one generation run
#[derive(Debug, Clone, PartialEq)]
pub struct StagedAsset {
    /// Publicly fetchable URL handed to the video provider
    pub url: String,

    /// Deletion handle for the object
    pub handle: String,
}

/// Ephemeral object storage for staging audio where the provider can fetch it
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes as a uniquely named public object
    async fn stage(&self, bytes: &[u8], content_type: &str) -> Result<StagedAsset>;

    /// Delete a staged object. Best-effort: failures are logged, never raised,
    /// so cleanup can run on every exit path without masking the primary result.
    async fn unstage(&self, asset: &StagedAsset);
}

/// Object storage client over an S3-style HTTP API
#[derive(Debug)]
pub struct HttpObjectStorage {
    config: StorageConfig,
    client: reqwest::Client,
}

impl HttpObjectStorage {
    pub fn new(config: StorageConfig) -> Result<Self> {
        if config.endpoint.is_none() {
            return Err(GenerationError::Configuration(
                "storage endpoint not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Unique object name so concurrent runs never collide
    fn object_name(content_type: &str) -> String {
        let extension = match content_type {
            "audio/wav" | "audio/x-wav" => "wav",
            "audio/mpeg" => "mp3",
            "audio/ogg" => "ogg",
            _ => "bin",
        };
        format!("podcast_audio_{}.{}", Utc::now().timestamp_millis(), extension)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn stage(&self, bytes: &[u8], content_type: &str) -> Result<StagedAsset> {
        let endpoint = self
            .config
            .endpoint
            .as_ref()
            .ok_or_else(|| GenerationError::Configuration("storage endpoint not configured".to_string()))?;

        let name = Self::object_name(content_type);
        let upload_url = format!("{}/{}", endpoint.trim_end_matches('/'), name);

        debug!("Uploading {} bytes to {}", bytes.len(), upload_url);

        let mut request = self
            .client
            .put(&upload_url)
            .header("content-type", content_type)
            .header("x-amz-acl", "public-read")
            .body(bytes.to_vec());

        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Staging(format!("upload to {} failed: {}", upload_url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Staging(format!(
                "storage error {}: {}",
                status, text
            )));
        }

        let public_base = self
            .config
            .public_base_url
            .as_deref()
            .unwrap_or(endpoint)
            .trim_end_matches('/');
        let public_url = format!("{}/{}", public_base, name);

        info!("📤 Staged audio object: {}", public_url);

        Ok(StagedAsset {
            url: public_url,
            handle: upload_url,
        })
    }

    async fn unstage(&self, asset: &StagedAsset) {
        let mut request = self.client.delete(&asset.handle);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!("🧹 Deleted staged audio object: {}", asset.handle);
            }
            Ok(response) => {
                // Already-deleted or never-created objects land here; not an error
                warn!(
                    "Failed to delete staged object {} (status {})",
                    asset.handle,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Failed to delete staged object {}: {}", asset.handle, e);
            }
        }
    }
}
