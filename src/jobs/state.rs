use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::record::JobRecord;

#[derive(Debug, Error)]
#[error("Unknown job state: {0}")]
pub struct UnknownJobState(pub String);

/// Lifecycle states the collector reports on.
///
/// States are independent scopes over the backend, not a partition:
/// `finished` covers both `succeeded` and `discarded`, and every `retried`
/// job is also `scheduled`. Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Scheduled,
    Retried,
    Queued,
    Running,
    Finished,
    Succeeded,
    Discarded,
}

impl JobState {
    pub const ALL: [JobState; 7] = [
        JobState::Scheduled,
        JobState::Retried,
        JobState::Queued,
        JobState::Running,
        JobState::Finished,
        JobState::Succeeded,
        JobState::Discarded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Scheduled => "scheduled",
            JobState::Retried => "retried",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Finished => "finished",
            JobState::Succeeded => "succeeded",
            JobState::Discarded => "discarded",
        }
    }

    /// Scope predicate: does `record` belong to this state at instant `now`?
    pub fn matches(&self, record: &JobRecord, now: DateTime<Utc>) -> bool {
        let waiting = record.finished_at.is_none() && record.performed_at.is_none();

        match self {
            JobState::Scheduled => waiting && record.effective_scheduled_at() > now,
            JobState::Retried => {
                waiting && record.effective_scheduled_at() > now && record.executions > 1
            }
            JobState::Queued => waiting && record.effective_scheduled_at() <= now,
            JobState::Running => record.performed_at.is_some() && record.finished_at.is_none(),
            JobState::Finished => record.finished_at.is_some(),
            JobState::Succeeded => record.finished_at.is_some() && record.error.is_none(),
            JobState::Discarded => record.finished_at.is_some() && record.error.is_some(),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = UnknownJobState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownJobState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn states_of(record: &JobRecord, now: DateTime<Utc>) -> Vec<JobState> {
        JobState::ALL
            .into_iter()
            .filter(|state| state.matches(record, now))
            .collect()
    }

    #[test]
    fn test_fresh_job_is_queued() {
        let now = Utc::now();
        let record = JobRecord::new("default").created(now - Duration::seconds(5));

        assert_eq!(states_of(&record, now), vec![JobState::Queued]);
    }

    #[test]
    fn test_future_job_is_scheduled() {
        let now = Utc::now();
        let record = JobRecord::new("default").scheduled_for(now + Duration::minutes(10));

        assert_eq!(states_of(&record, now), vec![JobState::Scheduled]);
    }

    #[test]
    fn test_rescheduled_retry_is_scheduled_and_retried() {
        let now = Utc::now();
        let record = JobRecord::new("mailers")
            .scheduled_for(now + Duration::minutes(1))
            .with_executions(2);

        assert_eq!(
            states_of(&record, now),
            vec![JobState::Scheduled, JobState::Retried]
        );
    }

    #[test]
    fn test_performing_job_is_running() {
        let now = Utc::now();
        let record = JobRecord::new("default").performed(now - Duration::seconds(1));

        assert_eq!(states_of(&record, now), vec![JobState::Running]);
    }

    #[test]
    fn test_finished_overlaps_outcome() {
        let now = Utc::now();
        let ok = JobRecord::new("default")
            .performed(now - Duration::seconds(3))
            .finished(now - Duration::seconds(1));
        let failed = ok.clone().with_error("boom");

        assert_eq!(
            states_of(&ok, now),
            vec![JobState::Finished, JobState::Succeeded]
        );
        assert_eq!(
            states_of(&failed, now),
            vec![JobState::Finished, JobState::Discarded]
        );
    }

    #[test]
    fn test_parse_and_display() {
        for state in JobState::ALL {
            assert_eq!(state.to_string().parse::<JobState>().unwrap(), state);
        }
        assert!("pending".parse::<JobState>().is_err());
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let json = serde_json::to_string(&JobState::Discarded).unwrap();
        assert_eq!(json, "\"discarded\"");
    }
}
