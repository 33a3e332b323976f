use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::feed::FeedConfig;
use crate::playback::PlaybackConfig;
use crate::session::SessionConfig;

/// Default config file looked up when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "config/signbridge";

/// Environment variable prefix (`SIGNBRIDGE__SERVICE__BASE_URL=...`)
pub const ENV_PREFIX: &str = "SIGNBRIDGE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub playback: PlaybackConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the remote session service
    pub base_url: String,
    /// Per-request timeout for gateway calls
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Load built-in defaults, then an optional file, then `SIGNBRIDGE__*` env vars.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to deserialize config")
    }
}
