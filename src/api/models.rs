//! API data models

use serde::{Deserialize, Serialize};

/// Inbound generation request.
///
/// Exactly one of `audio_url` / `audio_base64` must be set; the handler
/// rejects anything else before the pipeline runs.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Base64-encoded host portrait
    pub image_base64: String,

    /// Portrait mime type; defaults to image/png
    pub image_mime: Option<String>,

    /// Publicly fetchable audio URL
    pub audio_url: Option<String>,

    /// Base64-encoded raw audio (WAV), staged to public storage by the core
    pub audio_base64: Option<String>,
}

/// Successful generation response
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub video_url: String,
}

/// Structured error payload returned for every failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub kind: String,
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}
