//! In-process caches and their on-disk snapshots

mod clock;
mod problem_cache;
mod storage;

pub use clock::{Clock, SystemClock};
pub use problem_cache::{CacheEnvelope, CacheRead, CacheStatus, ProblemCache};
pub use storage::{JsonFileStore, SnapshotStore};

#[cfg(test)]
pub use clock::ManualClock;
#[cfg(test)]
pub use storage::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{NewContest, Problem};

/// Snapshot written after a sync that discovered contests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    /// Contests discovered by that sync
    pub contests: Vec<NewContest>,
    /// Their problems, flattened
    pub problems: Vec<Problem>,
    /// Epoch seconds
    pub last_sync: i64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl SyncSnapshot {
    pub fn new(contests: Vec<NewContest>, at: DateTime<Utc>) -> Self {
        let problems = contests.iter().flat_map(|c| c.problems.iter().cloned()).collect();
        Self {
            contests,
            problems,
            last_sync: at.timestamp(),
            timestamp: at.timestamp_millis(),
        }
    }
}
