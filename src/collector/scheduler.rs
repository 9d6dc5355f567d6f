use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use crate::observability::CollectorMetrics;
use crate::sink::MetricsSink;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Collection interval must be positive")]
    ZeroInterval,

    #[error("Tick timeout must be positive")]
    ZeroTickTimeout,
}

#[derive(Debug, Clone, Builder)]
pub struct SchedulerOptions {
    #[builder(default = DEFAULT_INTERVAL)]
    pub interval: Duration,
    #[builder(default)]
    pub by_queue: bool,
    /// Upper bound on one collect + deliver; defaults to `interval`
    pub tick_timeout: Option<Duration>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Delivered,
    CollectFailed,
    DeliveryFailed,
    TimedOut,
}

/// Drives the aggregator on a fixed-rate ticker and hands each snapshot to the sink
///
/// Ticks run strictly one after another: a tick that overruns its slot makes
/// the ticker skip the missed slots instead of firing them back to back.
/// Errors never leave a tick; they are logged and counted.
pub struct Scheduler {
    aggregator: Aggregator,
    sink: Arc<dyn MetricsSink>,
    options: SchedulerOptions,
    metrics: Arc<CollectorMetrics>,
}

impl Scheduler {
    pub fn new(
        aggregator: Aggregator,
        sink: Arc<dyn MetricsSink>,
        options: SchedulerOptions,
    ) -> Result<Self, SchedulerError> {
        if options.interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }
        if options.tick_timeout.is_some_and(|t| t.is_zero()) {
            return Err(SchedulerError::ZeroTickTimeout);
        }

        Ok(Self {
            aggregator,
            sink,
            options,
            metrics: Arc::new(CollectorMetrics::new()),
        })
    }

    /// Share counters with another component (e.g. the HTTP surface)
    pub fn with_metrics(mut self, metrics: Arc<CollectorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<CollectorMetrics> {
        self.metrics.clone()
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    pub fn tick_timeout(&self) -> Duration {
        self.options.tick_timeout.unwrap_or(self.options.interval)
    }

    /// Run one collect + deliver cycle, bounded by the tick timeout
    pub async fn tick(&self) -> TickOutcome {
        let started = Instant::now();
        self.metrics.tick_started();

        let outcome = match tokio::time::timeout(self.tick_timeout(), self.collect_and_deliver()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    timeout_ms = self.tick_timeout().as_millis() as u64,
                    "Tick exceeded its timeout, abandoning it"
                );
                self.metrics.tick_timed_out();
                TickOutcome::TimedOut
            }
        };

        debug!(
            ?outcome,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tick finished"
        );
        outcome
    }

    async fn collect_and_deliver(&self) -> TickOutcome {
        let snapshot = match self.aggregator.collect(self.options.by_queue).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Collection failed, skipping delivery");
                self.metrics.collect_failed();
                return TickOutcome::CollectFailed;
            }
        };

        match self.sink.deliver(&snapshot).await {
            Ok(()) => {
                self.metrics.snapshot_delivered();
                TickOutcome::Delivered
            }
            Err(e) => {
                warn!(sink = self.sink.name(), error = %e, "Snapshot delivery failed");
                self.metrics.delivery_failed();
                TickOutcome::DeliveryFailed
            }
        }
    }

    /// Tick until `shutdown` flips to true or its sender is dropped.
    ///
    /// The first tick fires immediately. An in-flight tick always runs to
    /// completion (bounded by the tick timeout) before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_ms = self.options.interval.as_millis() as u64,
            by_queue = self.options.by_queue,
            type_tag = self.aggregator.type_tag(),
            sink = self.sink.name(),
            "Collector started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        debug!("Shutdown sender dropped");
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            self.tick().await;
        }

        info!("Collector stopped");
    }

    /// Spawn the loop on the runtime.
    ///
    /// Consumes the scheduler, so one scheduler drives at most one loop.
    pub fn start(self) -> CollectorHandle {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(self.run(rx));
        CollectorHandle { shutdown, task }
    }
}

/// Owner of a running collector loop.
///
/// Dropping the handle also ends the loop after its current tick.
pub struct CollectorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CollectorHandle {
    /// Ask the loop to stop without waiting for it
    pub fn signal_stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Stop the loop and wait for the in-flight tick to finish
    pub async fn stop(self) {
        self.signal_stop();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Collector task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::sink::LogSink;

    fn aggregator() -> Aggregator {
        Aggregator::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_options_defaults() {
        let options = SchedulerOptions::default();
        assert_eq!(options.interval, Duration::from_secs(30));
        assert!(!options.by_queue);
        assert!(options.tick_timeout.is_none());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let options = SchedulerOptions::builder().interval(Duration::ZERO).build();
        let result = Scheduler::new(aggregator(), Arc::new(LogSink::new()), options);
        assert_eq!(result.err(), Some(SchedulerError::ZeroInterval));
    }

    #[test]
    fn test_rejects_zero_tick_timeout() {
        let options = SchedulerOptions::builder()
            .tick_timeout(Duration::ZERO)
            .build();
        let result = Scheduler::new(aggregator(), Arc::new(LogSink::new()), options);
        assert_eq!(result.err(), Some(SchedulerError::ZeroTickTimeout));
    }

    #[test]
    fn test_tick_timeout_defaults_to_interval() {
        let options = SchedulerOptions::builder()
            .interval(Duration::from_secs(15))
            .build();
        let scheduler = Scheduler::new(aggregator(), Arc::new(LogSink::new()), options).unwrap();
        assert_eq!(scheduler.tick_timeout(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_single_tick_delivers() {
        let scheduler =
            Scheduler::new(aggregator(), Arc::new(LogSink::new()), SchedulerOptions::default())
                .unwrap();

        assert_eq!(scheduler.tick().await, TickOutcome::Delivered);
        let stats = scheduler.metrics().snapshot();
        assert_eq!(stats.ticks_started, 1);
        assert_eq!(stats.snapshots_delivered, 1);
    }
}
