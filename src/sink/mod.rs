//! Metrics sink abstraction
//!
//! A sink receives one [`Snapshot`] per tick. Delivery is a single call per
//! tick; failures are reported back to the scheduler, which logs them and
//! carries on with the next tick.

mod fanout;
mod http;
mod latest;

pub use fanout::FanoutSink;
pub use http::HttpSink;
pub use latest::{DeliveredSnapshot, LatestSink};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::collector::Snapshot;
use crate::config::{SinkConfig, SinkProvider};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Sink rejected snapshot: HTTP {0}")]
    Rejected(u16),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid sink configuration: {0}")]
    InvalidConfig(String),

    #[error("{failed} of {total} sinks failed, first error: {first}")]
    Partial {
        failed: usize,
        total: usize,
        first: Box<SinkError>,
    },
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// Write-only destination for snapshots
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Deliver one snapshot
    async fn deliver(&self, snapshot: &Snapshot) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Sink that writes each snapshot as a structured log line
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSink for LogSink {
    async fn deliver(&self, snapshot: &Snapshot) -> Result<()> {
        let payload = serde_json::to_string(snapshot)?;
        tracing::info!(
            type_tag = %snapshot.type_tag,
            by_queue = snapshot.by_queue,
            %payload,
            "Job queue snapshot"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Build the sink selected by configuration.
///
/// `SinkConfig::default()` yields an HTTP sink pointed at the exporter's
/// default local endpoint; that is the default sink, built explicitly at
/// startup and owned by whoever calls this.
pub fn from_config(config: &SinkConfig) -> Result<Arc<dyn MetricsSink>> {
    match config.provider {
        SinkProvider::Http => Ok(Arc::new(HttpSink::new(config)?)),
        SinkProvider::Log => Ok(Arc::new(LogSink::new())),
    }
}
