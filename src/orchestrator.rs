use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::avatar::{AvatarVideoApi, HttpAvatarVideoClient, VideoDimensions};
use crate::config::Config;
use crate::error::{GenerationError, Result};
use crate::poller::{Sleeper, StatusPoller, TokioSleeper};
use crate::progress::{ProgressReporter, ProgressTracker};
use crate::storage::{HttpObjectStorage, ObjectStorage, StagedAsset};

/// Audio source for one generation request: a URL the provider can already
/// fetch, or raw bytes that must be staged publicly first
#[derive(Debug, Clone)]
pub enum AudioSource {
    Url(String),
    Bytes(Vec<u8>),
}

/// One immutable video-generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Host portrait bytes
    pub host_image: Vec<u8>,

    /// Portrait mime type (e.g. image/png)
    pub image_mime: String,

    /// Podcast audio track
    pub audio: AudioSource,
}

impl GenerationRequest {
    /// Fail fast on missing input, before any network call is made
    fn validate(&self) -> Result<()> {
        if self.host_image.is_empty() {
            return Err(GenerationError::Validation(
                "host image is required".to_string(),
            ));
        }

        match &self.audio {
            AudioSource::Url(audio_url) => {
                url::Url::parse(audio_url).map_err(|e| {
                    GenerationError::Validation(format!("invalid audio URL: {}", e))
                })?;
            }
            AudioSource::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(GenerationError::Validation(
                        "audio data is required".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Orchestrates one podcast-video generation end to end: stage audio,
/// create avatar, submit the video job, poll to completion, and always
/// clean up the staged audio object.
pub struct VideoGenerator {
    storage: Arc<dyn ObjectStorage>,
    provider: Arc<dyn AvatarVideoApi>,
    sleeper: Arc<dyn Sleeper>,
    poller: StatusPoller,
    dimensions: VideoDimensions,
    wall_clock_budget: Duration,
}

impl VideoGenerator {
    /// Build a generator with production collaborators from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let storage = HttpObjectStorage::new(config.storage.clone())?;
        let provider = HttpAvatarVideoClient::new(config.provider.clone())?;

        Ok(Self::with_collaborators(
            Arc::new(storage),
            Arc::new(provider),
            Arc::new(TokioSleeper),
            config,
        ))
    }

    /// Build a generator over explicit collaborators (used by tests)
    pub fn with_collaborators(
        storage: Arc<dyn ObjectStorage>,
        provider: Arc<dyn AvatarVideoApi>,
        sleeper: Arc<dyn Sleeper>,
        config: &Config,
    ) -> Self {
        Self {
            storage,
            provider,
            sleeper,
            poller: StatusPoller::new(
                Duration::from_secs(config.polling.interval_seconds),
                config.polling.max_attempts,
            ),
            dimensions: VideoDimensions {
                width: config.provider.video_width,
                height: config.provider.video_height,
            },
            wall_clock_budget: Duration::from_secs(config.polling.wall_clock_budget_seconds),
        }
    }

    /// Run one generation request to a final video URL.
    ///
    /// If the audio came as raw bytes, the staged object gets exactly one
    /// deletion attempt, on success and on every failure path.
    pub async fn run(&self, request: GenerationRequest) -> Result<String> {
        request.validate()?;

        info!("🎬 Starting podcast video generation");
        let progress = ProgressTracker::new();
        let _ticker = ProgressReporter::start(progress.clone());

        progress.set(5, "Preparing audio").await;
        let (audio_url, staged) = self.resolve_audio(&request.audio).await?;

        let outcome = tokio::time::timeout(
            self.wall_clock_budget,
            self.generate(&request, &audio_url, &progress),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GenerationError::PollingTimeout(format!(
                "wall-clock budget of {}s exhausted",
                self.wall_clock_budget.as_secs()
            )))
        });

        // Unconditional cleanup: runs whether generation succeeded or not,
        // and its own failures are logged inside unstage, never raised
        if let Some(asset) = &staged {
            self.storage.unstage(asset).await;
        }

        let video_url = outcome?;
        progress.complete("Video ready").await;
        info!("✅ Podcast video ready: {}", video_url);

        Ok(video_url)
    }

    /// Materialize a publicly fetchable audio URL, staging raw bytes if needed
    async fn resolve_audio(&self, audio: &AudioSource) -> Result<(String, Option<StagedAsset>)> {
        match audio {
            AudioSource::Url(audio_url) => {
                info!("🎧 Using caller-provided audio URL");
                Ok((audio_url.clone(), None))
            }
            AudioSource::Bytes(bytes) => {
                info!("🎧 Staging {} bytes of audio", bytes.len());
                let asset = self.storage.stage(bytes, "audio/wav").await?;
                Ok((asset.url.clone(), Some(asset)))
            }
        }
    }

    /// Avatar creation, job submission, and polling, in order
    async fn generate(
        &self,
        request: &GenerationRequest,
        audio_url: &str,
        progress: &ProgressTracker,
    ) -> Result<String> {
        progress.set(20, "Creating avatar").await;
        let avatar_id = self.provider.create_avatar(&request.host_image).await?;
        info!("🧑 Created avatar identity: {}", avatar_id);

        progress.set(40, "Submitting video job").await;
        let video_id = self
            .provider
            .submit_video_job(&avatar_id, audio_url, self.dimensions)
            .await?;
        info!("📨 Submitted video job: {}", video_id);

        progress.set(55, "Rendering video").await;
        self.poller
            .poll(self.provider.as_ref(), self.sleeper.as_ref(), &video_id)
            .await
    }
}
