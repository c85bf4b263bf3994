//! Configuration management.
//!
//! qlens configuration can come from:
//! - Environment variables (QLENS_*)
//! - Config file (~/.config/qlens/config.toml)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// qlens configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provisioning engine tuning
    #[serde(default)]
    pub provision: ProvisionConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provisioning engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Seconds between confirmation poll attempts
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Confirmation poll budget in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,

    /// Seconds to wait after a lens-list refresh before filling the
    /// fresh row slot
    #[serde(default = "default_lens_refresh_delay")]
    pub lens_refresh_delay_seconds: u64,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            poll_timeout_seconds: default_poll_timeout(),
            lens_refresh_delay_seconds: default_lens_refresh_delay(),
        }
    }
}

fn default_poll_interval() -> u64 {
    crate::engine::POLL_INTERVAL.as_secs()
}

fn default_poll_timeout() -> u64 {
    crate::engine::DEFAULT_POLL_TIMEOUT.as_secs()
}

fn default_lens_refresh_delay() -> u64 {
    3
}

impl ProvisionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds)
    }

    pub fn lens_refresh_delay(&self) -> Duration {
        Duration::from_secs(self.lens_refresh_delay_seconds)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Self {
        let mut config = Self::default();

        let primary_path = Self::config_dir().join("config.toml");
        if let Ok(partial) = Self::load_partial_from_path(&primary_path) {
            config.apply_partial(partial);
        }

        config.apply_env_overrides();
        config
    }

    /// Get the data directory.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("qlens"))
            .unwrap_or_else(|| PathBuf::from(".qlens"))
    }

    /// Get the config directory.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("qlens"))
            .unwrap_or_else(|| PathBuf::from(".qlens"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(interval) = std::env::var("QLENS_POLL_INTERVAL_SECONDS") {
            if let Ok(parsed) = interval.parse::<u64>() {
                self.provision.poll_interval_seconds = parsed;
            }
        }
        if let Ok(timeout) = std::env::var("QLENS_POLL_TIMEOUT_SECONDS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                self.provision.poll_timeout_seconds = parsed;
            }
        }
        if let Ok(delay) = std::env::var("QLENS_LENS_REFRESH_DELAY_SECONDS") {
            if let Ok(parsed) = delay.parse::<u64>() {
                self.provision.lens_refresh_delay_seconds = parsed;
            }
        }
        if let Ok(path) = std::env::var("QLENS_DATABASE_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    fn load_partial_from_path(path: &Path) -> std::result::Result<PartialConfig, ()> {
        let content = std::fs::read_to_string(path).map_err(|_| ())?;
        toml::from_str(&content).map_err(|_| ())
    }

    fn apply_partial(&mut self, partial: PartialConfig) {
        if let Some(provision) = partial.provision {
            self.provision = provision;
        }
        if let Some(storage) = partial.storage {
            self.storage = storage;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    provision: Option<ProvisionConfig>,
    storage: Option<StorageConfig>,
}
