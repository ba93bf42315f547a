use axum::http::StatusCode;

/// Result type for video generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Error types for the video generation pipeline
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Audio staging failed: {0}")]
    Staging(String),

    #[error("Avatar creation failed: {0}")]
    AvatarCreation(String),

    #[error("Video submission failed: {0}")]
    VideoSubmission(String),

    #[error("Status check failed: {0}")]
    StatusCheck(String),

    #[error("Video generation failed: {0}")]
    ProviderJobFailed(String),

    #[error("Video generation timed out: {0}")]
    PollingTimeout(String),
}

impl GenerationError {
    /// Stable machine-readable kind, used by the API layer
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Configuration(_) => "configuration",
            Self::Staging(_) => "staging",
            Self::AvatarCreation(_) => "avatar_creation",
            Self::VideoSubmission(_) => "video_submission",
            Self::StatusCheck(_) => "status_check",
            Self::ProviderJobFailed(_) => "provider_job_failed",
            Self::PollingTimeout(_) => "polling_timeout",
        }
    }

    /// HTTP status code this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Staging(_)
            | Self::AvatarCreation(_)
            | Self::VideoSubmission(_)
            | Self::StatusCheck(_)
            | Self::ProviderJobFailed(_) => StatusCode::BAD_GATEWAY,
            Self::PollingTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}
