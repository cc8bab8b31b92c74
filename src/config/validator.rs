//! Configuration validator
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, HistoryConfig, LoggingConfig, WorksetConfig};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_workset(&config.workset)?;
        Self::validate_history(&config.history)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates working-set configuration
    fn validate_workset(workset: &WorksetConfig) -> Result<(), ConfigError> {
        if workset.refresh_interval_ms < 50 {
            return Err(ConfigError::Invalid(
                "Refresh interval must be at least 50 ms".to_string(),
            ));
        }

        if workset.command_queue_depth == 0 || workset.command_queue_depth > 4096 {
            return Err(ConfigError::Invalid(
                "Command queue depth must be between 1 and 4096".to_string(),
            ));
        }

        if workset.parallel_sort_threshold == 0 {
            return Err(ConfigError::Invalid(
                "Parallel sort threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates search history configuration
    fn validate_history(history: &HistoryConfig) -> Result<(), ConfigError> {
        if history.capacity == 0 {
            return Err(ConfigError::Invalid(
                "History capacity must be at least 1".to_string(),
            ));
        }

        if history.capacity > 1000 {
            return Err(ConfigError::Invalid(
                "History capacity cannot exceed 1000".to_string(),
            ));
        }

        if history.store_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "History store key cannot be empty".to_string(),
            ));
        }

        if history.store_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "History store path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_refresh_interval() {
        let mut config = Config::default();
        config.workset.refresh_interval_ms = 10;
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("Refresh interval"));
    }

    #[test]
    fn test_invalid_queue_depth() {
        let mut config = Config::default();
        config.workset.command_queue_depth = 0;
        assert!(validate_config(&config).is_err());

        config.workset.command_queue_depth = 4097;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_history_capacity() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(validate_config(&config).is_err());

        config.history.capacity = 1001;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_blank_store_key() {
        let mut config = Config::default();
        config.history.store_key = "  ".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("store key"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("log level"));
    }

    #[test]
    fn test_edge_cases() {
        let mut config = Config::default();

        config.workset.refresh_interval_ms = 50;
        config.workset.command_queue_depth = 1;
        config.workset.parallel_sort_threshold = 1;
        config.history.capacity = 1;
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());

        config.workset.command_queue_depth = 4096;
        config.history.capacity = 1000;
        assert!(validate_config(&config).is_ok());
    }
}
