//! API request handlers

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{GenerationError, Result};
use crate::orchestrator::{AudioSource, GenerationRequest, VideoGenerator};

use super::models::{GenerateRequest, GenerateResponse, HealthResponse};

/// Handle health check requests
pub async fn health_check() -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        service: "podcast-studio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Decode an inbound payload into a core request.
///
/// Base64 handling lives here so the core only ever sees bytes.
pub fn decode_request(payload: GenerateRequest) -> Result<GenerationRequest> {
    let host_image = BASE64
        .decode(payload.image_base64.as_bytes())
        .map_err(|e| GenerationError::Validation(format!("invalid image_base64: {}", e)))?;

    let audio = match (payload.audio_url, payload.audio_base64) {
        (Some(audio_url), None) => AudioSource::Url(audio_url),
        (None, Some(audio_base64)) => {
            let bytes = BASE64
                .decode(audio_base64.as_bytes())
                .map_err(|e| GenerationError::Validation(format!("invalid audio_base64: {}", e)))?;
            AudioSource::Bytes(bytes)
        }
        (Some(_), Some(_)) => {
            return Err(GenerationError::Validation(
                "provide either audio_url or audio_base64, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(GenerationError::Validation(
                "audio_url or audio_base64 is required".to_string(),
            ))
        }
    };

    Ok(GenerationRequest {
        host_image,
        image_mime: payload.image_mime.unwrap_or_else(|| "image/png".to_string()),
        audio,
    })
}

/// Handle one video-generation request end to end
pub async fn generate_video(
    generator: &VideoGenerator,
    payload: GenerateRequest,
) -> Result<GenerateResponse> {
    let request = decode_request(payload)?;
    let video_url = generator.run(request).await?;
    Ok(GenerateResponse { video_url })
}
