//! Default configuration values for the working set

use crate::history::{DEFAULT_CAPACITY, DEFAULT_STORE_KEY};
use crate::workset::registry::DEFAULT_PARALLEL_SORT_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub workset: WorksetDefaults,
    pub history: HistoryDefaults,
    pub logging: LoggingDefaults,
}

/// Default working-set configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksetDefaults {
    pub refresh_interval_ms: u64,
    pub command_queue_depth: usize,
    pub parallel_sort_threshold: usize,
}

/// Default search history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDefaults {
    pub capacity: usize,
    pub store_key: String,
    pub store_path: String,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        workset: WorksetDefaults {
            refresh_interval_ms: 1000,
            command_queue_depth: 64,
            parallel_sort_threshold: DEFAULT_PARALLEL_SORT_THRESHOLD,
        },
        history: HistoryDefaults {
            capacity: DEFAULT_CAPACITY,
            store_key: DEFAULT_STORE_KEY.to_string(),
            store_path: "workset-store.json".to_string(),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workset_defaults() {
        let config = default_config();
        assert_eq!(config.workset.refresh_interval_ms, 1000);
        assert_eq!(config.workset.command_queue_depth, 64);
        assert_eq!(config.workset.parallel_sort_threshold, 4096);
    }

    #[test]
    fn test_history_defaults() {
        let config = default_config();
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.store_key, "search_history");
        assert_eq!(config.history.store_path, "workset-store.json");
    }

    #[test]
    fn test_logging_defaults() {
        assert_eq!(default_config().logging.level, "info");
    }

    #[test]
    fn test_serialization() {
        let config = default_config();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("capacity"));
        assert!(serialized.contains("refresh_interval_ms"));

        let deserialized: ConfigDefaults = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.history.capacity, config.history.capacity);
        assert_eq!(deserialized.logging.level, config.logging.level);
    }
}
