//! Per-tick aggregate record handed to the metrics sink.
//!
//! Wire shape (one JSON object per tick):
//!
//! ```json
//! {
//!   "type": "good_job",
//!   "by_queue": true,
//!   "scheduled": {"default": 3, "mailers": 0},
//!   "retried":   {"default": 0, "mailers": 0},
//!   "queued":    {"default": 1, "mailers": 4},
//!   "running":   {"default": 0, "mailers": 1},
//!   "finished":  {"default": 9, "mailers": 2},
//!   "succeeded": {"default": 8, "mailers": 2},
//!   "discarded": {"default": 1, "mailers": 0}
//! }
//! ```
//!
//! In ungrouped mode every state maps to a bare integer instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::jobs::JobState;

/// Tag the downstream exporter uses to route the payload to its collector
pub const DEFAULT_TYPE_TAG: &str = "good_job";

/// Count for one state: a scalar, or one entry per known queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Total(u64),
    ByQueue(BTreeMap<String, u64>),
}

impl CountValue {
    /// Scalar total across queues
    pub fn total(&self) -> u64 {
        match self {
            CountValue::Total(n) => *n,
            CountValue::ByQueue(counts) => counts.values().sum(),
        }
    }

    pub fn queue(&self, name: &str) -> Option<u64> {
        match self {
            CountValue::Total(_) => None,
            CountValue::ByQueue(counts) => counts.get(name).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub by_queue: bool,
    #[serde(flatten)]
    counts: BTreeMap<JobState, CountValue>,
}

impl Snapshot {
    /// Build a snapshot; `counts` is expected to hold every [`JobState`]
    pub fn new(
        type_tag: impl Into<String>,
        by_queue: bool,
        counts: BTreeMap<JobState, CountValue>,
    ) -> Self {
        Self {
            type_tag: type_tag.into(),
            by_queue,
            counts,
        }
    }

    pub fn get(&self, state: JobState) -> Option<&CountValue> {
        self.counts.get(&state)
    }

    /// Iterate states in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (JobState, &CountValue)> {
        self.counts.iter().map(|(state, value)| (*state, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ungrouped(n: u64) -> Snapshot {
        let counts = JobState::ALL
            .into_iter()
            .map(|state| (state, CountValue::Total(n)))
            .collect();
        Snapshot::new(DEFAULT_TYPE_TAG, false, counts)
    }

    #[test]
    fn test_ungrouped_wire_shape() {
        let value = serde_json::to_value(ungrouped(0)).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "good_job",
                "by_queue": false,
                "scheduled": 0,
                "retried": 0,
                "queued": 0,
                "running": 0,
                "finished": 0,
                "succeeded": 0,
                "discarded": 0
            })
        );
    }

    #[test]
    fn test_grouped_wire_shape() {
        let per_queue: BTreeMap<String, u64> =
            [("default".to_string(), 3), ("mailers".to_string(), 0)].into();
        let counts = JobState::ALL
            .into_iter()
            .map(|state| (state, CountValue::ByQueue(per_queue.clone())))
            .collect();
        let snapshot = Snapshot::new("jobs", true, counts);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["type"], "jobs");
        assert_eq!(value["by_queue"], true);
        assert_eq!(value["scheduled"], json!({"default": 3, "mailers": 0}));
        assert_eq!(value["discarded"], json!({"default": 3, "mailers": 0}));
    }

    #[test]
    fn test_serialization_is_stable() {
        let a = serde_json::to_string(&ungrouped(7)).unwrap();
        let b = serde_json::to_string(&ungrouped(7)).unwrap();
        assert_eq!(a, b);
        assert!(a.find("\"scheduled\"").unwrap() < a.find("\"discarded\"").unwrap());
    }

    #[test]
    fn test_parses_exported_payload() {
        let payload = r#"{"type":"good_job","by_queue":true,
            "scheduled":{"default":3},"retried":{"default":0},"queued":{"default":1},
            "running":{"default":0},"finished":{"default":2},"succeeded":{"default":2},
            "discarded":{"default":0}}"#;

        let snapshot: Snapshot = serde_json::from_str(payload).unwrap();
        assert!(snapshot.by_queue);
        assert_eq!(snapshot.get(JobState::Scheduled).unwrap().queue("default"), Some(3));
        assert_eq!(snapshot.iter().count(), 7);
    }

    #[test]
    fn test_count_value_total() {
        let grouped = CountValue::ByQueue([("a".to_string(), 2), ("b".to_string(), 5)].into());
        assert_eq!(grouped.total(), 7);
        assert_eq!(CountValue::Total(4).total(), 4);
        assert_eq!(CountValue::Total(4).queue("a"), None);
    }
}
