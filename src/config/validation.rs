use super::models::{BackendProvider, Config, SinkProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Collection interval must be positive")]
    InvalidInterval,

    #[error("Tick timeout must be positive when set")]
    InvalidTickTimeout,

    #[error("Snapshot type tag must not be empty")]
    EmptyTypeTag,

    #[error("Invalid sink endpoint scheme '{endpoint}', expected 'http://' or 'https://'")]
    InvalidSinkScheme { endpoint: String },

    #[error("Sink timeout must be positive")]
    InvalidSinkTimeout,

    #[error("Fjall backend requires a non-empty path")]
    MissingBackendPath,

    #[error("Memory backend holds no jobs; use it for one-shot collection only")]
    EphemeralBackend,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_collector(config)?;
    validate_backend(config)?;
    validate_sink(config)?;
    Ok(())
}

/// Extra checks for the long-running collector loop
pub fn validate_for_run(config: &Config) -> Result<(), ValidationError> {
    validate(config)?;

    // Nothing can write into an in-process backend started from the CLI
    if config.backend.provider == BackendProvider::Memory {
        return Err(ValidationError::EphemeralBackend);
    }

    Ok(())
}

fn validate_collector(config: &Config) -> Result<(), ValidationError> {
    if config.collector.interval.is_zero() {
        return Err(ValidationError::InvalidInterval);
    }

    if config.collector.tick_timeout.is_some_and(|t| t.is_zero()) {
        return Err(ValidationError::InvalidTickTimeout);
    }

    if config.collector.type_tag.trim().is_empty() {
        return Err(ValidationError::EmptyTypeTag);
    }

    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ValidationError> {
    if config.backend.provider == BackendProvider::Fjall
        && config.backend.path.as_os_str().is_empty()
    {
        return Err(ValidationError::MissingBackendPath);
    }

    Ok(())
}

/// Endpoint and timeout only matter for the HTTP sink
fn validate_sink(config: &Config) -> Result<(), ValidationError> {
    if config.sink.provider != SinkProvider::Http {
        return Ok(());
    }

    let endpoint = &config.sink.endpoint;
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ValidationError::InvalidSinkScheme {
            endpoint: endpoint.clone(),
        });
    }

    if config.sink.timeout.is_zero() {
        return Err(ValidationError::InvalidSinkTimeout);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::models::*;
    use super::*;
    use crate::humanize::HumanDuration;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_interval() {
        let mut config = Config::default();
        config.collector.interval = HumanDuration::from_secs(0);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidInterval)
        ));
    }

    #[test]
    fn test_zero_tick_timeout() {
        let mut config = Config::default();
        config.collector.tick_timeout = Some(HumanDuration::from_secs(0));

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidTickTimeout)
        ));
    }

    #[test]
    fn test_empty_type_tag() {
        let mut config = Config::default();
        config.collector.type_tag = "  ".to_string();

        assert!(matches!(validate(&config), Err(ValidationError::EmptyTypeTag)));
    }

    #[test]
    fn test_invalid_sink_scheme() {
        let mut config = Config::default();
        config.sink.endpoint = "localhost:9394".to_string();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidSinkScheme { .. })
        ));
    }

    #[test]
    fn test_log_sink_ignores_endpoint() {
        let mut config = Config::default();
        config.sink.provider = SinkProvider::Log;
        config.sink.endpoint = String::new();

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_sink_timeout() {
        let mut config = Config::default();
        config.sink.timeout = HumanDuration::from_secs(0);

        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidSinkTimeout)
        ));
    }

    #[test]
    fn test_fjall_requires_path() {
        let mut config = Config::default();
        config.backend.path = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingBackendPath)
        ));

        config.backend.provider = BackendProvider::Memory;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_run_rejects_memory_backend() {
        let mut config = Config::default();
        assert!(validate_for_run(&config).is_ok());

        config.backend.provider = BackendProvider::Memory;
        assert!(validate(&config).is_ok());
        assert!(matches!(
            validate_for_run(&config),
            Err(ValidationError::EphemeralBackend)
        ));
    }
}
