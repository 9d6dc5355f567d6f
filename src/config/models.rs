use crate::collector::DEFAULT_TYPE_TAG;
use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Collection loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectorConfig {
    #[serde(default = "default_interval")]
    pub interval: HumanDuration,
    /// Break every state down per queue name
    #[serde(default)]
    pub by_queue: bool,
    /// Bound on one collect + deliver; falls back to `interval`
    #[serde(default)]
    pub tick_timeout: Option<HumanDuration>,
    /// Value of the `type` field in every snapshot
    #[serde(default = "default_type_tag")]
    pub type_tag: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            by_queue: false,
            tick_timeout: None,
            type_tag: default_type_tag(),
        }
    }
}

fn default_interval() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_type_tag() -> String {
    DEFAULT_TYPE_TAG.to_string()
}

/// Backend provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    #[default]
    Fjall,
    Memory,
}

/// Job-queue backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub provider: BackendProvider,
    #[serde(default = "default_backend_path")]
    pub path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::default(),
            path: default_backend_path(),
        }
    }
}

fn default_backend_path() -> PathBuf {
    PathBuf::from("data/jobs")
}

/// Sink provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkProvider {
    #[default]
    Http,
    Log,
}

/// Metrics sink configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub provider: SinkProvider,
    /// Exporter base URL; snapshots go to `{endpoint}/send-metrics`
    #[serde(default = "default_sink_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_sink_timeout")]
    pub timeout: HumanDuration,
    /// Static labels attached to every payload
    #[serde(default)]
    pub custom_labels: BTreeMap<String, String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            provider: SinkProvider::default(),
            endpoint: default_sink_endpoint(),
            timeout: default_sink_timeout(),
            custom_labels: BTreeMap::new(),
        }
    }
}

fn default_sink_endpoint() -> String {
    "http://localhost:9394".to_string()
}

fn default_sink_timeout() -> HumanDuration {
    HumanDuration::from_secs(5)
}

/// Local HTTP surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.collector.interval.as_duration(), Duration::from_secs(30));
        assert!(!config.collector.by_queue);
        assert_eq!(config.collector.type_tag, "good_job");
        assert_eq!(config.backend.provider, BackendProvider::Fjall);
        assert_eq!(config.sink.provider, SinkProvider::Http);
        assert_eq!(config.sink.endpoint, "http://localhost:9394");
        assert!(!config.server.enabled);
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:9100");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[collector]
by_queue = true

[sink]
provider = "log"
            "#,
        )
        .unwrap();

        assert!(config.collector.by_queue);
        assert_eq!(config.collector.interval, HumanDuration::from_secs(30));
        assert_eq!(config.sink.provider, SinkProvider::Log);
        assert_eq!(config.backend.path, PathBuf::from("data/jobs"));
    }
}
