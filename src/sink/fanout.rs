use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::{MetricsSink, Result, SinkError};
use crate::collector::Snapshot;

/// Delivers to every inner sink in order; one failing sink does not stop the rest
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn MetricsSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl MetricsSink for FanoutSink {
    async fn deliver(&self, snapshot: &Snapshot) -> Result<()> {
        let mut first_error = None;
        let mut failed = 0;

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(snapshot).await {
                warn!(sink = sink.name(), error = %e, "Fanout delivery failed");
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => Ok(()),
            Some(first) => Err(SinkError::Partial {
                failed,
                total: self.sinks.len(),
                first: Box::new(first),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fanout"
    }
}
