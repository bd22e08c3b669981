//! Runtime tunables for the kitchen: sweep cadence, staleness threshold and
//! channel sizing. Loaded from TOML; every key is optional.
//!
//! ```toml
//! stale_after = "3m"
//! stale_sweep_interval = "60s"
//! queue_drain_interval = "2m"
//! channel_buffer = 32
//! auto_assign_waiters = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable the demo binary reads the config path from.
pub const CONFIG_ENV_VAR: &str = "BRIGADE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// How long a PENDING order may sit without a chef before the stale sweep
    /// picks it up.
    #[serde(with = "humantime_serde", default = "default_stale_after")]
    pub stale_after: Duration,

    #[serde(with = "humantime_serde", default = "default_stale_sweep_interval")]
    pub stale_sweep_interval: Duration,

    #[serde(with = "humantime_serde", default = "default_queue_drain_interval")]
    pub queue_drain_interval: Duration,

    /// Capacity of the kitchen actor's request channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,

    /// Whether the stale sweep also hands out waiters round-robin.
    #[serde(default = "default_true")]
    pub auto_assign_waiters: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            stale_after: default_stale_after(),
            stale_sweep_interval: default_stale_sweep_interval(),
            queue_drain_interval: default_queue_drain_interval(),
            channel_buffer: default_channel_buffer(),
            auto_assign_waiters: default_true(),
        }
    }
}

impl KitchenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The staleness threshold as a signed duration for timestamp arithmetic.
    pub fn stale_after_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.stale_after).unwrap_or(chrono::Duration::MAX)
    }
}

fn default_stale_after() -> Duration {
    Duration::from_secs(3 * 60)
}

fn default_stale_sweep_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_queue_drain_interval() -> Duration {
    Duration::from_secs(120)
}

fn default_channel_buffer() -> usize {
    32
}

fn default_true() -> bool {
    true
}
