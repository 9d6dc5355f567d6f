//! Collection cycle: aggregate backend counts, deliver one snapshot per tick
//!
//! - [`Aggregator`] - queries the backend and builds a [`Snapshot`]
//! - [`Scheduler`] - fixed-rate loop calling the aggregator and the sink
//! - [`CollectorHandle`] - cooperative shutdown of a running loop
//!
//! ```rust,ignore
//! use queuewatch::collector::{Aggregator, Scheduler, SchedulerOptions};
//!
//! let aggregator = Aggregator::new(backend);
//! let scheduler = Scheduler::new(aggregator, sink, SchedulerOptions::default())?;
//! let handle = scheduler.start();
//! // ...
//! handle.stop().await;
//! ```

mod aggregator;
mod scheduler;
mod snapshot;

pub use aggregator::{Aggregator, CollectError, zero_fill};
pub use scheduler::{
    CollectorHandle, DEFAULT_INTERVAL, Scheduler, SchedulerError, SchedulerOptions, TickOutcome,
};
pub use snapshot::{CountValue, DEFAULT_TYPE_TAG, Snapshot};
