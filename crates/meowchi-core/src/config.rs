//! Configuration loading and typed config structures for Meowchi.
//!
//! The configuration lives in `meowchi.yaml`. Every section is optional and
//! every field has a default, so an empty file (or no file at all) runs the
//! pet with its production tunables.
//!
//! Environment variables override the file:
//! - `MEOWCHI_SAVE_DIR` overrides `storage.save_dir`
//! - `MEOWCHI_TEST_MODE=1` shortens every period to its development value

use std::path::{Path, PathBuf};

use meowchi_pet::{EvolutionConfig, StatsConfig};
use meowchi_store::StoreConfig;
use serde::Deserialize;
use tracing::info;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `meowchi.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PetConfig {
    /// Use the short development periods everywhere.
    #[serde(default)]
    pub test_mode: bool,

    /// Stat decay and care tunables.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Evolution tunables.
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Save locations and retention.
    #[serde(default)]
    pub storage: StoreConfig,

    /// Runner timers.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PetConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "no config file, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `MEOWCHI_SAVE_DIR` and `MEOWCHI_TEST_MODE` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("MEOWCHI_SAVE_DIR").filter(|d| !d.is_empty()) {
            self.storage.save_dir = PathBuf::from(dir);
        }
        if lookup("MEOWCHI_TEST_MODE").is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
            self.test_mode = true;
        }
        if self.test_mode {
            self.stats = self.stats.clone().with_test_periods();
            self.evolution = self.evolution.clone().with_test_periods();
            self.schedule = self.schedule.with_test_periods();
        }
    }
}

/// Runner timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Base tick driving stat decay and evolution checks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Autosave period in milliseconds.
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,
}

impl ScheduleConfig {
    /// Replace the autosave period with its development value (30 s).
    #[must_use]
    pub const fn with_test_periods(mut self) -> Self {
        self.autosave_interval_ms = 30_000;
        self
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            autosave_interval_ms: default_autosave_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_autosave_interval_ms() -> u64 {
    60_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
