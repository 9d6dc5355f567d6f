use std::sync::Arc;

use crate::config::Config;
use crate::observability::CollectorMetrics;
use crate::sink::LatestSink;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub latest: LatestSink,
    pub metrics: Arc<CollectorMetrics>,
}

impl AppState {
    pub fn new(config: Config, latest: LatestSink, metrics: Arc<CollectorMetrics>) -> Self {
        Self {
            config: Arc::new(config),
            latest,
            metrics,
        }
    }
}
