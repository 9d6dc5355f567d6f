use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{JobBackend, Result, tally};
use crate::jobs::{JobRecord, JobState};

/// In-process backend over a shared list of job records
///
/// Clones share the same records, so a test can keep one handle to mutate
/// while the collector queries another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<RwLock<Vec<JobRecord>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<JobRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn insert(&self, record: JobRecord) {
        debug!(job_id = %record.id, queue = %record.queue_name, "Recorded job");
        self.records.write().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl JobBackend for MemoryBackend {
    async fn count_by_state(&self, state: JobState) -> Result<u64> {
        let now = Utc::now();
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| state.matches(r, now)).count() as u64)
    }

    async fn count_by_state_grouped_by_queue(
        &self,
        state: JobState,
    ) -> Result<BTreeMap<String, u64>> {
        let records = self.records.read().await;
        Ok(tally(records.iter(), state, Utc::now()))
    }

    async fn list_distinct_queue_names(&self) -> Result<BTreeSet<String>> {
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.queue_name.clone()).collect())
    }
}
