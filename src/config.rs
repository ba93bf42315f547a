use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Configuration for the podcast video generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ephemeral object storage settings
    pub storage: StorageConfig,

    /// Avatar/video provider settings
    pub provider: ProviderConfig,

    /// Job status polling settings
    pub polling: PollingConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL objects are uploaded to (PUT {endpoint}/{name})
    pub endpoint: Option<String>,

    /// Public base URL the provider fetches objects from; defaults to the endpoint
    pub public_base_url: Option<String>,

    /// Bearer token for upload/delete calls
    pub access_token: Option<String>,

    /// Timeout for upload/delete requests (seconds)
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the avatar/video API
    pub base_url: Option<String>,

    /// API key for the avatar/video API
    pub api_key: Option<String>,

    /// Submit video jobs as non-billing test requests
    pub test_mode: bool,

    /// Output video width in pixels
    pub video_width: u32,

    /// Output video height in pixels
    pub video_height: u32,

    /// Timeout for individual provider requests (seconds)
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed delay between status checks (seconds)
    pub interval_seconds: u64,

    /// Maximum number of status checks before giving up
    pub max_attempts: u32,

    /// Overall wall-clock budget for one generation (seconds).
    /// Must exceed interval_seconds * max_attempts.
    pub wall_clock_budget_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the API server binds to
    pub port: u16,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "podcast-studio.toml",
            "config/podcast-studio.toml",
            "~/.config/podcast-studio/config.toml",
            "/etc/podcast-studio/config.toml",
        ];

        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                match Self::load_from_path(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to defaults plus environment variables
        Ok(Self::from_env())
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config: Config = toml::from_str(&config_str).map_err(|e| {
            GenerationError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build configuration from defaults and environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("PODCAST_STUDIO_STORAGE_ENDPOINT") {
            self.storage.endpoint = Some(endpoint);
        }

        if let Ok(token) = std::env::var("PODCAST_STUDIO_STORAGE_TOKEN") {
            self.storage.access_token = Some(token);
        }

        if let Ok(base_url) = std::env::var("PODCAST_STUDIO_PROVIDER_URL") {
            self.provider.base_url = Some(base_url);
        }

        if let Ok(api_key) = std::env::var("PODCAST_STUDIO_API_KEY") {
            self.provider.api_key = Some(api_key);
        }

        if let Ok(port) = std::env::var("PODCAST_STUDIO_PORT") {
            self.server.port = port.parse().unwrap_or(self.server.port);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.endpoint.is_none() {
            return Err(GenerationError::Configuration(
                "storage endpoint is required".to_string(),
            ));
        }

        if self.provider.base_url.is_none() {
            return Err(GenerationError::Configuration(
                "provider base URL is required".to_string(),
            ));
        }

        if self.provider.api_key.is_none() {
            return Err(GenerationError::Configuration(
                "provider API key is required".to_string(),
            ));
        }

        if self.polling.interval_seconds == 0 || self.polling.max_attempts == 0 {
            return Err(GenerationError::Configuration(
                "polling interval and max attempts must be greater than 0".to_string(),
            ));
        }

        // The wall-clock budget must leave room for the poller to reach its own ceiling
        let poll_ceiling = self.polling.interval_seconds * self.polling.max_attempts as u64;
        if self.polling.wall_clock_budget_seconds <= poll_ceiling {
            return Err(GenerationError::Configuration(format!(
                "wall-clock budget ({}s) must exceed poll ceiling ({}s)",
                self.polling.wall_clock_budget_seconds, poll_ceiling
            )));
        }

        if self.provider.video_width == 0 || self.provider.video_height == 0 {
            return Err(GenerationError::Configuration(
                "video dimensions must be greater than 0".to_string(),
            ));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Podcast Studio Configuration:\n\
            - Server Port: {}\n\
            - Storage Endpoint: {}\n\
            - Provider URL: {}\n\
            - Test Mode: {}\n\
            - Video Dimensions: {}x{}\n\
            - Poll Interval: {}s\n\
            - Poll Attempts: {}\n\
            - Wall-Clock Budget: {}s",
            self.server.port,
            self.storage.endpoint.as_deref().unwrap_or("<unset>"),
            self.provider.base_url.as_deref().unwrap_or("<unset>"),
            self.provider.test_mode,
            self.provider.video_width,
            self.provider.video_height,
            self.polling.interval_seconds,
            self.polling.max_attempts,
            self.polling.wall_clock_budget_seconds,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                endpoint: None,
                public_base_url: None,
                access_token: None,
                request_timeout_seconds: 60,
            },
            provider: ProviderConfig {
                base_url: None,
                api_key: None,
                test_mode: true,
                video_width: 1280,
                video_height: 720,
                request_timeout_seconds: 30,
            },
            polling: PollingConfig {
                interval_seconds: 10,
                max_attempts: 30,
                wall_clock_budget_seconds: 360, // 6 minutes, above the 5-minute poll ceiling
            },
            server: ServerConfig { port: 8080 },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_storage_endpoint(mut self, endpoint: String) -> Self {
        self.config.storage.endpoint = Some(endpoint);
        self
    }

    pub fn with_storage_token(mut self, token: String) -> Self {
        self.config.storage.access_token = Some(token);
        self
    }

    pub fn with_provider_url(mut self, base_url: String) -> Self {
        self.config.provider.base_url = Some(base_url);
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.provider.api_key = Some(api_key);
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.config.provider.test_mode = test_mode;
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.config.provider.video_width = width;
        self.config.provider.video_height = height;
        self
    }

    pub fn with_polling(mut self, interval_seconds: u64, max_attempts: u32) -> Self {
        self.config.polling.interval_seconds = interval_seconds;
        self.config.polling.max_attempts = max_attempts;
        self
    }

    pub fn with_wall_clock_budget(mut self, seconds: u64) -> Self {
        self.config.polling.wall_clock_budget_seconds = seconds;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
