//! HTTP sink posting snapshots to a metrics exporter

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use super::{MetricsSink, Result, SinkError};
use crate::collector::Snapshot;
use crate::config::SinkConfig;

/// Path the exporter accepts collector payloads on
pub const SEND_PATH: &str = "/send-metrics";

const USER_AGENT: &str = concat!("queuewatch/", env!("CARGO_PKG_VERSION"));

/// Posts each snapshot as a JSON body to `{endpoint}/send-metrics`
pub struct HttpSink {
    client: Client,
    url: String,
    custom_labels: BTreeMap<String, String>,
}

impl HttpSink {
    pub fn new(config: &SinkConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(SinkError::InvalidConfig(format!(
                "endpoint must be http:// or https://, got '{}'",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .connect_timeout(config.timeout.as_duration())
            .timeout(config.timeout.as_duration())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SinkError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", endpoint, SEND_PATH),
            custom_labels: config.custom_labels.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Snapshot JSON, plus `custom_labels` when any are configured
    pub fn payload(&self, snapshot: &Snapshot) -> Result<Value> {
        let mut payload = serde_json::to_value(snapshot)?;

        if !self.custom_labels.is_empty() {
            if let Value::Object(map) = &mut payload {
                map.insert(
                    "custom_labels".to_string(),
                    serde_json::to_value(&self.custom_labels)?,
                );
            }
        }

        Ok(payload)
    }
}

#[async_trait]
impl MetricsSink for HttpSink {
    async fn deliver(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = self.payload(snapshot)?;

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout
                } else {
                    SinkError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status.as_u16()));
        }

        debug!(url = %self.url, "Snapshot delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
