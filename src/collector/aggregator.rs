use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::snapshot::{CountValue, DEFAULT_TYPE_TAG, Snapshot};
use crate::backend::{BackendError, JobBackend};
use crate::jobs::JobState;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Listing queue names failed: {0}")]
    QueueDiscovery(#[source] BackendError),

    #[error("Counting {state} jobs failed: {source}")]
    Count {
        state: JobState,
        #[source]
        source: BackendError,
    },
}

pub type Result<T> = std::result::Result<T, CollectError>;

/// Turns backend counts into one [`Snapshot`] per call
///
/// Stateless between calls: the queue universe is rediscovered on every
/// grouped collection. Any failed query fails the whole collection; there
/// are no partial snapshots.
#[derive(Clone)]
pub struct Aggregator {
    backend: Arc<dyn JobBackend>,
    type_tag: String,
}

impl Aggregator {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self::with_type_tag(backend, DEFAULT_TYPE_TAG)
    }

    pub fn with_type_tag(backend: Arc<dyn JobBackend>, type_tag: impl Into<String>) -> Self {
        Self {
            backend,
            type_tag: type_tag.into(),
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub async fn collect(&self, by_queue: bool) -> Result<Snapshot> {
        let counts = if by_queue {
            self.collect_grouped().await?
        } else {
            self.collect_totals().await?
        };

        Ok(Snapshot::new(self.type_tag.clone(), by_queue, counts))
    }

    async fn collect_totals(&self) -> Result<BTreeMap<JobState, CountValue>> {
        let mut counts = BTreeMap::new();

        for state in JobState::ALL {
            let total = self
                .backend
                .count_by_state(state)
                .await
                .map_err(|source| CollectError::Count { state, source })?;
            counts.insert(state, CountValue::Total(total));
        }

        Ok(counts)
    }

    async fn collect_grouped(&self) -> Result<BTreeMap<JobState, CountValue>> {
        let queues = self
            .backend
            .list_distinct_queue_names()
            .await
            .map_err(CollectError::QueueDiscovery)?;
        debug!(queues = queues.len(), "Discovered queues");

        let mut counts = BTreeMap::new();

        for state in JobState::ALL {
            let sparse = self
                .backend
                .count_by_state_grouped_by_queue(state)
                .await
                .map_err(|source| CollectError::Count { state, source })?;
            counts.insert(state, CountValue::ByQueue(zero_fill(state, sparse, &queues)));
        }

        Ok(counts)
    }
}

/// Align a sparse per-queue result with the queue set discovered this tick.
///
/// Known queues missing from `sparse` get an explicit zero. Queues not in
/// `queues` appeared after discovery and are left for the next tick.
pub fn zero_fill(
    state: JobState,
    mut sparse: BTreeMap<String, u64>,
    queues: &BTreeSet<String>,
) -> BTreeMap<String, u64> {
    sparse.retain(|queue, _| {
        let known = queues.contains(queue);
        if !known {
            debug!(%state, queue = %queue, "Dropping queue discovered mid-tick");
        }
        known
    });

    for queue in queues {
        sparse.entry(queue.clone()).or_insert(0);
    }

    sparse
}
