use std::net::SocketAddr;
use std::time::Duration;

use tracing::trace;

use crate::{history::DEFAULT_HISTORY_CAPACITY, thresholds::AlertThresholds};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub source: SourceConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    /// Initial alert thresholds (defaults to 70/90 CPU, 80/95 memory)
    pub thresholds: Option<AlertThresholds>,

    /// API server settings (optional - defaults to localhost)
    pub api: Option<ApiSettings>,

    /// Log level for the engine targets (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

/// Where entities and snapshots come from
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SourceConfig {
    /// Base URL of the entity-management API
    pub url: String,

    pub token: Option<String>,

    /// Per-request timeout of the HTTP client in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Cadences and limits of the poller
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct PollingConfig {
    /// Refresh interval of the running-entity list in seconds
    #[serde(default = "default_entity_interval")]
    pub entity_interval_secs: u64,

    /// Snapshot tick interval in seconds
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: u64,

    /// Give up on a single snapshot fetch after this many milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Maximum number of snapshot fetches in flight
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Number of aggregate points kept in the rolling history
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Whether auto-refresh starts enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl PollingConfig {
    pub fn entity_interval(&self) -> Duration {
        Duration::from_secs(self.entity_interval_secs.max(1))
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs.max(1))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            entity_interval_secs: default_entity_interval(),
            snapshot_interval_secs: default_snapshot_interval(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            history_capacity: default_history_capacity(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiSettings {
    /// Bind address; falls back to VMT_API_ADDR / VMT_API_PORT
    pub bind: Option<SocketAddr>,

    /// Bearer token; falls back to VMT_API_TOKEN
    pub token: Option<String>,

    #[serde(default = "default_enabled")]
    pub cors: bool,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_entity_interval() -> u64 {
    5
}

fn default_snapshot_interval() -> u64 {
    1
}

fn default_fetch_timeout_ms() -> u64 {
    2000
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_enabled() -> bool {
    true
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))?;

    if let Some(thresholds) = &config.thresholds {
        thresholds.validate()?;
    }

    trace!("loaded config: {config:?}");
    Ok(config)
}
