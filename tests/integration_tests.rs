use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use podcast_studio_rust::{
    AudioSource, AvatarVideoApi, Config, ConfigBuilder, GenerationError, GenerationRequest,
    JobStatus, JobStatusReport, ObjectStorage, Result, Sleeper, StagedAsset, VideoDimensions,
    VideoGenerator,
};

/// Object storage stub recording every stage/unstage call
struct MockStorage {
    fail_stage: bool,
    stage_calls: AtomicU32,
    unstage_calls: AtomicU32,
    unstaged_handles: Mutex<Vec<String>>,
}

impl MockStorage {
    fn new() -> Self {
        Self {
            fail_stage: false,
            stage_calls: AtomicU32::new(0),
            unstage_calls: AtomicU32::new(0),
            unstaged_handles: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail_stage: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn stage(&self, _bytes: &[u8], _content_type: &str) -> Result<StagedAsset> {
        self.stage_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stage {
            return Err(GenerationError::Staging("storage error 503: busy".to_string()));
        }
        Ok(StagedAsset {
            url: "https://store/ex1.wav".to_string(),
            handle: "https://store/ex1.wav".to_string(),
        })
    }

    async fn unstage(&self, asset: &StagedAsset) {
        self.unstage_calls.fetch_add(1, Ordering::SeqCst);
        self.unstaged_handles
            .lock()
            .unwrap()
            .push(asset.handle.clone());
    }
}

/// Provider stub replaying scripted results and recording calls
struct MockProvider {
    avatar_error: Option<String>,
    submit_error: Option<String>,
    statuses: Mutex<Vec<Result<JobStatusReport>>>,
    create_calls: AtomicU32,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
    submissions: Mutex<Vec<(String, String)>>,
}

impl MockProvider {
    fn new(statuses: Vec<Result<JobStatusReport>>) -> Self {
        let mut reversed = statuses;
        reversed.reverse();
        Self {
            avatar_error: None,
            submit_error: None,
            statuses: Mutex::new(reversed),
            create_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    fn rejecting_avatar(error: &str) -> Self {
        Self {
            avatar_error: Some(error.to_string()),
            ..Self::new(Vec::new())
        }
    }
}

fn processing() -> Result<JobStatusReport> {
    Ok(JobStatusReport {
        status: JobStatus::Processing,
        video_url: None,
        error_message: None,
    })
}

fn succeeded(url: &str) -> Result<JobStatusReport> {
    Ok(JobStatusReport {
        status: JobStatus::Succeeded,
        video_url: Some(url.to_string()),
        error_message: None,
    })
}

fn failed(message: &str) -> Result<JobStatusReport> {
    Ok(JobStatusReport {
        status: JobStatus::Failed,
        video_url: None,
        error_message: Some(message.to_string()),
    })
}

#[async_trait]
impl AvatarVideoApi for MockProvider {
    async fn create_avatar(&self, _image_bytes: &[u8]) -> Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.avatar_error {
            return Err(GenerationError::AvatarCreation(format!(
                "avatar API error 400: {}",
                error
            )));
        }
        Ok("avatar_42".to_string())
    }

    async fn submit_video_job(
        &self,
        avatar_id: &str,
        audio_url: &str,
        _dimensions: VideoDimensions,
    ) -> Result<String> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.submit_error {
            return Err(GenerationError::VideoSubmission(error.clone()));
        }
        self.submissions
            .lock()
            .unwrap()
            .push((avatar_id.to_string(), audio_url.to_string()));
        Ok("job_7".to_string())
    }

    async fn check_status(&self, _video_id: &str) -> Result<JobStatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(processing)
    }
}

/// Sleeper that never actually waits
struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

fn test_config() -> Config {
    ConfigBuilder::new()
        .with_storage_endpoint("https://store".to_string())
        .with_provider_url("https://avatar.example.com".to_string())
        .with_api_key("key".to_string())
        .build()
}

fn generator(
    storage: Arc<MockStorage>,
    provider: Arc<MockProvider>,
    config: &Config,
) -> VideoGenerator {
    VideoGenerator::with_collaborators(storage, provider, Arc::new(InstantSleeper), config)
}

fn image_request(audio: AudioSource) -> GenerationRequest {
    GenerationRequest {
        host_image: b"IMG".to_vec(),
        image_mime: "image/png".to_string(),
        audio,
    }
}

#[tokio::test]
async fn test_end_to_end_with_staged_audio() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::new(vec![
        processing(),
        processing(),
        succeeded("https://cdn/out.mp4"),
    ]));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let url = generator
        .run(image_request(AudioSource::Bytes(b"AUD".to_vec())))
        .await
        .unwrap();

    assert_eq!(url, "https://cdn/out.mp4");
    assert_eq!(storage.stage_calls.load(Ordering::SeqCst), 1);
    // Exactly one deletion attempt for the staged asset
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        storage.unstaged_handles.lock().unwrap().as_slice(),
        &["https://store/ex1.wav".to_string()]
    );
    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 3);

    // The job was submitted with the created avatar and the staged URL
    let submissions = provider.submissions.lock().unwrap();
    assert_eq!(
        submissions.as_slice(),
        &[("avatar_42".to_string(), "https://store/ex1.wav".to_string())]
    );
}

#[tokio::test]
async fn test_audio_url_skips_staging_entirely() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::new(vec![succeeded("https://cdn/out.mp4")]));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let url = generator
        .run(image_request(AudioSource::Url(
            "https://example.com/podcast.wav".to_string(),
        )))
        .await
        .unwrap();

    assert_eq!(url, "https://cdn/out.mp4");
    assert_eq!(storage.stage_calls.load(Ordering::SeqCst), 0);
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_image_fails_fast_with_zero_network_calls() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::new(Vec::new()));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let err = generator
        .run(GenerationRequest {
            host_image: Vec::new(),
            image_mime: "image/png".to_string(),
            audio: AudioSource::Bytes(b"AUD".to_vec()),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "validation");
    assert_eq!(storage.stage_calls.load(Ordering::SeqCst), 0);
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_avatar_rejection_preserves_provider_text_and_skips_later_steps() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::rejecting_avatar("invalid image"));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    // Audio given as a pre-existing URL: nothing staged, nothing to clean up
    let err = generator
        .run(image_request(AudioSource::Url(
            "https://example.com/podcast.wav".to_string(),
        )))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "avatar_creation");
    assert!(err.to_string().contains("invalid image"));
    assert_eq!(provider.submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 0);
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provider_job_failure_still_cleans_up_staged_audio() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::new(vec![
        processing(),
        failed("face detection failed"),
    ]));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let err = generator
        .run(image_request(AudioSource::Bytes(b"AUD".to_vec())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "provider_job_failed");
    assert!(err.to_string().contains("face detection failed"));
    // Stopped at the failing check; no attempt k+1
    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 2);
    // The staged asset still got its one deletion attempt
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_polling_timeout_after_exactly_max_attempts() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(MockProvider::new(Vec::new())); // never terminal
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let err = generator
        .run(image_request(AudioSource::Bytes(b"AUD".to_vec())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "polling_timeout");
    assert_eq!(provider.status_calls.load(Ordering::SeqCst), 30);
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_staging_failure_aborts_before_any_provider_call() {
    let storage = Arc::new(MockStorage::failing());
    let provider = Arc::new(MockProvider::new(Vec::new()));
    let config = test_config();
    let generator = generator(storage.clone(), provider.clone(), &config);

    let err = generator
        .run(image_request(AudioSource::Bytes(b"AUD".to_vec())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "staging");
    assert_eq!(provider.create_calls.load(Ordering::SeqCst), 0);
    // Nothing was staged, so nothing is deleted
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 0);
}

/// Provider whose avatar creation hangs, to exercise the wall-clock budget
struct HangingProvider {
    create_calls: AtomicU32,
}

#[async_trait]
impl AvatarVideoApi for HangingProvider {
    async fn create_avatar(&self, _image_bytes: &[u8]) -> Result<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("avatar_42".to_string())
    }

    async fn submit_video_job(
        &self,
        _avatar_id: &str,
        _audio_url: &str,
        _dimensions: VideoDimensions,
    ) -> Result<String> {
        unreachable!("never reached while avatar creation hangs")
    }

    async fn check_status(&self, _video_id: &str) -> Result<JobStatusReport> {
        unreachable!("never reached while avatar creation hangs")
    }
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_budget_bounds_a_hung_provider() {
    let storage = Arc::new(MockStorage::new());
    let provider = Arc::new(HangingProvider {
        create_calls: AtomicU32::new(0),
    });
    let config = ConfigBuilder::new()
        .with_storage_endpoint("https://store".to_string())
        .with_provider_url("https://avatar.example.com".to_string())
        .with_api_key("key".to_string())
        .with_polling(1, 5)
        .with_wall_clock_budget(10)
        .build();
    let generator = VideoGenerator::with_collaborators(
        storage.clone(),
        provider.clone(),
        Arc::new(InstantSleeper),
        &config,
    );

    let err = generator
        .run(image_request(AudioSource::Bytes(b"AUD".to_vec())))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "polling_timeout");
    assert_eq!(provider.create_calls.load(Ordering::SeqCst), 1);
    // Cleanup still runs after the budget fires
    assert_eq!(storage.unstage_calls.load(Ordering::SeqCst), 1);
}
