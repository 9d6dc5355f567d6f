//! Query-only access to the job-queue backend
//!
//! The collector never writes through this interface. Each operation is an
//! independent read; no consistency is promised across calls, so two
//! queries in the same tick may observe different backend states.
//!
//! Implementations:
//! - [`MemoryBackend`] - in-process records, used for dry runs and tests
//! - [`FjallBackend`] - job records persisted in an embedded Fjall keyspace

mod memory;
mod partitions;
mod store;

pub use memory::MemoryBackend;
pub use store::FjallBackend;

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{BackendConfig, BackendProvider};
use crate::jobs::{JobRecord, JobState};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Backend query capability consumed by the aggregator
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Number of jobs currently in `state`
    async fn count_by_state(&self, state: JobState) -> Result<u64>;

    /// Per-queue counts for `state`; queues with no matching job are absent
    async fn count_by_state_grouped_by_queue(
        &self,
        state: JobState,
    ) -> Result<BTreeMap<String, u64>>;

    /// Every queue name with at least one job, in any state
    async fn list_distinct_queue_names(&self) -> Result<BTreeSet<String>>;
}

/// Open the backend selected by configuration
pub fn from_config(config: &BackendConfig) -> Result<Arc<dyn JobBackend>> {
    match config.provider {
        BackendProvider::Memory => Ok(Arc::new(MemoryBackend::new())),
        BackendProvider::Fjall => Ok(Arc::new(FjallBackend::open(&config.path)?)),
    }
}

/// Shared scan used by the record-holding backends
pub(crate) fn tally<'a, I>(
    records: I,
    state: JobState,
    now: chrono::DateTime<chrono::Utc>,
) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a JobRecord>,
{
    let mut counts = BTreeMap::new();
    for record in records {
        if state.matches(record, now) {
            *counts.entry(record.queue_name.clone()).or_insert(0) += 1;
        }
    }
    counts
}
