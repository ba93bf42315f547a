use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod avatar;
mod config;
mod error;
mod orchestrator;
mod poller;
mod progress;
mod storage;

use crate::config::Config;
use crate::orchestrator::VideoGenerator;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Podcast Studio (Rust)")
        .version("0.1.0")
        .about("Avatar podcast video generation service")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port for the API server (overrides configuration)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "podcast_studio=debug,info"
        } else {
            "podcast_studio=info,warn"
        })
        .init();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from_path(path).context("failed to load configuration")?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };

    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse().context("invalid --port value")?;
    }

    config
        .validate()
        .context("configuration validation failed")?;

    info!("🚀 Podcast Studio (Rust) starting...");
    info!("{}", config.summary());

    let generator = VideoGenerator::new(&config).context("failed to build video generator")?;
    let port = config.server.port;

    let server = api::ApiServer::new(Arc::new(generator), Arc::new(config), port);
    server.start().await?;

    Ok(())
}
