//! Collector self-metrics and tracing setup

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Counters describing the collector loop itself
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    ticks_started: AtomicU64,
    snapshots_delivered: AtomicU64,
    collect_failures: AtomicU64,
    delivery_failures: AtomicU64,
    ticks_timed_out: AtomicU64,
}

impl CollectorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_started(&self) {
        self.ticks_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_delivered(&self) {
        self.snapshots_delivered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "snapshots_delivered", "Metric incremented");
    }

    pub fn collect_failed(&self) {
        self.collect_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "collect_failures", "Metric incremented");
    }

    pub fn delivery_failed(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "delivery_failures", "Metric incremented");
    }

    pub fn tick_timed_out(&self) {
        self.ticks_timed_out.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "ticks_timed_out", "Metric incremented");
    }

    pub fn snapshot(&self) -> CollectorStats {
        CollectorStats {
            ticks_started: self.ticks_started.load(Ordering::Relaxed),
            snapshots_delivered: self.snapshots_delivered.load(Ordering::Relaxed),
            collect_failures: self.collect_failures.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            ticks_timed_out: self.ticks_timed_out.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectorStats {
    pub ticks_started: u64,
    pub snapshots_delivered: u64,
    pub collect_failures: u64,
    pub delivery_failures: u64,
    pub ticks_timed_out: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = CollectorMetrics::new();
        metrics.tick_started();
        metrics.tick_started();
        metrics.snapshot_delivered();
        metrics.collect_failed();

        let stats = metrics.snapshot();
        assert_eq!(stats.ticks_started, 2);
        assert_eq!(stats.snapshots_delivered, 1);
        assert_eq!(stats.collect_failures, 1);
        assert_eq!(stats.delivery_failures, 0);
        assert_eq!(stats.ticks_timed_out, 0);
    }
}
