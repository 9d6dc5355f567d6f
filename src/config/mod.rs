//! Configuration management for queuewatch
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use queuewatch::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Collecting every {}", config.collector.interval);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `QUEUEWATCH__<section>__<key>`
//!
//! Examples:
//! - `QUEUEWATCH__COLLECTOR__INTERVAL=15s`
//! - `QUEUEWATCH__COLLECTOR__BY_QUEUE=true`
//! - `QUEUEWATCH__SINK__ENDPOINT=http://exporter:9394`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/queuewatch.toml`.
//! This can be overridden using the `QUEUEWATCH_CONFIG` environment variable.
//!
//! # Backends
//!
//! `backend.provider = "memory"` starts with no jobs and nothing outside the
//! process can add any, so it is a dry-run mode: `queuewatch collect` accepts
//! it to show the snapshot shape, while `queuewatch run` rejects it through
//! [`Config::validate_for_run`].

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{
    BackendConfig, BackendProvider, CollectorConfig, Config, ServerConfig, SinkConfig,
    SinkProvider,
};
pub use validation::ValidationError;

use crate::collector::SchedulerOptions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation (zero interval, bad sink endpoint, ...).
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Re-run validation after in-process overrides (e.g. CLI flags)
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)?;
        Ok(())
    }

    /// Validation for the long-running loop; also rejects the memory backend
    pub fn validate_for_run(&self) -> Result<(), ConfigError> {
        validation::validate_for_run(self)?;
        Ok(())
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions::builder()
            .interval(self.collector.interval.as_duration())
            .by_queue(self.collector.by_queue)
            .maybe_tick_timeout(self.collector.tick_timeout.map(|t| t.as_duration()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[collector]\ninterval = \"10s\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.collector.interval, HumanDuration::from_secs(10));
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[collector]\ninterval = 0\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidInterval)
        ));
    }

    #[test]
    fn test_malformed_duration_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[collector]\ninterval = \"soon\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }

    #[test]
    fn test_oversized_duration_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[collector]\ninterval = \"9000000000000000h\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }

    #[test]
    fn test_run_rejects_memory_backend_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[backend]\nprovider = \"memory\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert!(matches!(
            config.validate_for_run().unwrap_err(),
            ConfigError::ValidationError(ValidationError::EphemeralBackend)
        ));
    }

    #[test]
    fn test_scheduler_options_from_config() {
        let mut config = Config::default();
        config.collector.by_queue = true;
        config.collector.tick_timeout = Some(HumanDuration::from_secs(3));

        let options = config.scheduler_options();
        assert_eq!(options.interval, Duration::from_secs(30));
        assert!(options.by_queue);
        assert_eq!(options.tick_timeout, Some(Duration::from_secs(3)));
    }
}
