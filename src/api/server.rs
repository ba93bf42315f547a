//! HTTP server implementation for the API

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::Config;
use crate::orchestrator::VideoGenerator;

use super::{handlers, models};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<VideoGenerator>,
    pub config: Arc<Config>,
}

/// Configure and start the HTTP server
pub async fn start_http_server(
    generator: Arc<VideoGenerator>,
    config: Arc<Config>,
    port: u16,
) -> anyhow::Result<()> {
    info!("🚀 Starting HTTP server on port {}", port);

    let app = build_router(AppState { generator, config });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 API server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
///
/// The CORS layer answers pre-flight OPTIONS requests; only POST is routed
/// for /api/generate, so every other verb gets 405 from the router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check().await))
}

/// Video generation handler
async fn generate_handler(
    State(state): State<AppState>,
    Json(payload): Json<models::GenerateRequest>,
) -> impl IntoResponse {
    match handlers::generate_video(&state.generator, payload).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => (
            e.status_code(),
            Json(models::ApiErrorBody {
                error: e.to_string(),
                kind: e.kind().to_string(),
            }),
        )
            .into_response(),
    }
}
