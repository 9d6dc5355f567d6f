use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One job row as the backend stores it.
///
/// Only the fields the state scopes look at are modelled; payloads and
/// arguments stay with the job system that owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub queue_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub performed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    /// Number of times the job has been attempted (0 until first perform)
    #[serde(default)]
    pub executions: u32,
}

impl JobRecord {
    /// New job in `queue_name`, created now and ready to run
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            queue_name: queue_name.into(),
            created_at: Utc::now(),
            scheduled_at: None,
            performed_at: None,
            finished_at: None,
            error: None,
            executions: 0,
        }
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn scheduled_for(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn performed(mut self, at: DateTime<Utc>) -> Self {
        self.performed_at = Some(at);
        self.executions = self.executions.max(1);
        self
    }

    pub fn finished(mut self, at: DateTime<Utc>) -> Self {
        self.finished_at = Some(at);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_executions(mut self, executions: u32) -> Self {
        self.executions = executions;
        self
    }

    /// Jobs without an explicit schedule become runnable at creation
    pub fn effective_scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at.unwrap_or(self.created_at)
    }
}
