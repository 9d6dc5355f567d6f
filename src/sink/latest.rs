use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{MetricsSink, Result};
use crate::collector::Snapshot;

#[derive(Debug, Clone, Serialize)]
pub struct DeliveredSnapshot {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub delivered_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

/// Keeps the most recent snapshot for the local HTTP surface
#[derive(Debug, Clone, Default)]
pub struct LatestSink {
    latest: Arc<RwLock<Option<DeliveredSnapshot>>>,
}

impl LatestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self) -> Option<DeliveredSnapshot> {
        self.latest.read().await.clone()
    }
}

#[async_trait]
impl MetricsSink for LatestSink {
    async fn deliver(&self, snapshot: &Snapshot) -> Result<()> {
        *self.latest.write().await = Some(DeliveredSnapshot {
            delivered_at: Utc::now(),
            snapshot: snapshot.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "latest"
    }
}
