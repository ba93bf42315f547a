//! API module for the podcast video generation service
//!
//! Provides the REST surface for the web UI: one generation endpoint
//! plus a health check, with CORS pre-flight handling.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::orchestrator::VideoGenerator;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API server for handling generation requests
pub struct ApiServer {
    generator: Arc<VideoGenerator>,
    config: Arc<Config>,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(generator: Arc<VideoGenerator>, config: Arc<Config>, port: u16) -> Self {
        Self {
            generator,
            config,
            port,
        }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);

        server::start_http_server(self.generator, self.config, self.port).await
    }
}
