//! Configuration loader
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file read by [`load_config`]
pub const DEFAULT_CONFIG_FILE: &str = "workset.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_workset")]
    pub workset: WorksetConfig,

    #[serde(default = "default_history")]
    pub history: HistoryConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Working-set configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksetConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_command_queue_depth")]
    pub command_queue_depth: usize,
    #[serde(default = "default_parallel_sort_threshold")]
    pub parallel_sort_threshold: usize,
}

impl WorksetConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Search history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    #[serde(default = "default_store_key")]
    pub store_key: String,
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file is missing or bad
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_default()
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location, falling back to defaults
/// only when the file does not exist
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Loads configuration from `path`, falling back to defaults only when the
/// file does not exist
pub fn load_config_from<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    match ConfigLoader::new(path).load() {
        Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
        other => other,
    }
}

// Default functions for serde
fn default_workset() -> WorksetConfig {
    let defaults = default_config();
    WorksetConfig {
        refresh_interval_ms: defaults.workset.refresh_interval_ms,
        command_queue_depth: defaults.workset.command_queue_depth,
        parallel_sort_threshold: defaults.workset.parallel_sort_threshold,
    }
}

fn default_history() -> HistoryConfig {
    let defaults = default_config();
    HistoryConfig {
        capacity: defaults.history.capacity,
        store_key: defaults.history.store_key,
        store_path: defaults.history.store_path,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

// Individual field defaults
fn default_refresh_interval_ms() -> u64 {
    default_config().workset.refresh_interval_ms
}

fn default_command_queue_depth() -> usize {
    default_config().workset.command_queue_depth
}

fn default_parallel_sort_threshold() -> usize {
    default_config().workset.parallel_sort_threshold
}

fn default_history_capacity() -> usize {
    default_config().history.capacity
}

fn default_store_key() -> String {
    default_config().history.store_key
}

fn default_store_path() -> String {
    default_config().history.store_path
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workset: default_workset(),
            history: default_history(),
            logging: default_logging(),
        }
    }
}
