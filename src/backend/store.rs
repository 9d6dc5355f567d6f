use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::partitions::{JOB_PREFIX, decode_job_key, encode_job_key};
use super::{JobBackend, Result, tally};
use crate::jobs::{JobRecord, JobState};

/// Fjall-backed job record store
///
/// The job system writes records with [`FjallBackend::upsert`]; the
/// collector only scans. Every query is a full prefix scan run on the
/// blocking pool, so the async runtime never stalls on disk reads.
#[derive(Clone)]
pub struct FjallBackend {
    keyspace: Keyspace,
    jobs: PartitionHandle,
}

impl FjallBackend {
    /// Open or create a job store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening job store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let jobs = keyspace.open_partition("jobs", PartitionCreateOptions::default())?;

        info!("Job store opened successfully");
        Ok(Self { keyspace, jobs })
    }

    /// Store or update a job record
    pub fn upsert(&self, record: &JobRecord) -> Result<()> {
        let key = encode_job_key(&record.id);
        let value = serde_json::to_vec(record)?;
        self.jobs.insert(key, value)?;
        debug!(job_id = %record.id, queue = %record.queue_name, "Upserted job");
        Ok(())
    }

    /// Get a job record by id
    pub fn get(&self, id: &Uuid) -> Result<Option<JobRecord>> {
        match self.jobs.get(encode_job_key(id))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, id: &Uuid) -> Result<()> {
        self.jobs.remove(encode_job_key(id))?;
        Ok(())
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<JobRecord>> {
        let mut records = Vec::new();

        for item in self.jobs.prefix(JOB_PREFIX) {
            let (key, value) = item?;
            match serde_json::from_slice::<JobRecord>(&value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // Corrupt rows are skipped, not fatal
                    warn!(key = ?decode_job_key(&key), error = %e, "Skipping undecodable job record");
                }
            }
        }

        Ok(records)
    }

    async fn records(&self) -> Result<Vec<JobRecord>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_all()).await?
    }
}

#[async_trait]
impl JobBackend for FjallBackend {
    async fn count_by_state(&self, state: JobState) -> Result<u64> {
        let now = Utc::now();
        let records = self.records().await?;
        Ok(records.iter().filter(|r| state.matches(r, now)).count() as u64)
    }

    async fn count_by_state_grouped_by_queue(
        &self,
        state: JobState,
    ) -> Result<BTreeMap<String, u64>> {
        let records = self.records().await?;
        Ok(tally(records.iter(), state, Utc::now()))
    }

    async fn list_distinct_queue_names(&self) -> Result<BTreeSet<String>> {
        let records = self.records().await?;
        Ok(records.into_iter().map(|r| r.queue_name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> (FjallBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FjallBackend::open(temp_dir.path().join("jobs")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_upsert_and_get() {
        let (store, _temp) = create_test_store();
        let record = JobRecord::new("default");

        store.upsert(&record).unwrap();
        let retrieved = store.get(&record.id).unwrap().unwrap();

        assert_eq!(retrieved.id, record.id);
        assert_eq!(retrieved.queue_name, "default");
    }

    #[test]
    fn test_upsert_overwrites_lifecycle() {
        let (store, _temp) = create_test_store();
        let record = JobRecord::new("default");
        store.upsert(&record).unwrap();

        let done = record.clone().performed(Utc::now()).finished(Utc::now());
        store.upsert(&done).unwrap();

        let retrieved = store.get(&record.id).unwrap().unwrap();
        assert!(retrieved.finished_at.is_some());
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let (store, _temp) = create_test_store();
        let record = JobRecord::new("default");
        store.upsert(&record).unwrap();

        store.remove(&record.id).unwrap();
        assert!(store.get(&record.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_queries_scan_records() {
        let (store, _temp) = create_test_store();
        let now = Utc::now();

        store
            .upsert(&JobRecord::new("default").scheduled_for(now + Duration::hours(1)))
            .unwrap();
        store
            .upsert(&JobRecord::new("default").created(now - Duration::minutes(5)))
            .unwrap();
        store
            .upsert(&JobRecord::new("mailers").created(now - Duration::minutes(5)))
            .unwrap();

        assert_eq!(store.count_by_state(JobState::Queued).await.unwrap(), 2);
        assert_eq!(store.count_by_state(JobState::Scheduled).await.unwrap(), 1);

        let queued = store
            .count_by_state_grouped_by_queue(JobState::Queued)
            .await
            .unwrap();
        assert_eq!(queued["default"], 1);
        assert_eq!(queued["mailers"], 1);

        let names = store.list_distinct_queue_names().await.unwrap();
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobs");

        {
            let store = FjallBackend::open(&path).unwrap();
            store.upsert(&JobRecord::new("reports")).unwrap();
            store.persist().unwrap();
        }

        let store = FjallBackend::open(&path).unwrap();
        let names = store.list_distinct_queue_names().await.unwrap();
        assert!(names.contains("reports"));
    }
}
