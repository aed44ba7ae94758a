//! Problemset cache
//!
//! One snapshot of the merged problemset lives in memory and is mirrored to
//! a JSON file. A snapshot is fresh while `now - ts < ttl`; after that the
//! next read fetches from upstream and, if that fails, falls back to the
//! stale snapshot.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{Clock, SnapshotStore};
use crate::{
    codeforces::CodeforcesApi,
    error::{AppError, AppResult},
    models::{MergedProblem, merge_with_stats},
};

/// On-disk envelope: `{"ts": <epoch millis>, "problems": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
    pub problems: Vec<MergedProblem>,
}

/// How a read was served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Stale => "STALE",
        }
    }
}

/// Result of a cache read
#[derive(Debug, Clone)]
pub struct CacheRead {
    pub problems: Arc<Vec<MergedProblem>>,
    pub status: CacheStatus,
    /// Seconds a downstream cache may keep this response
    pub max_age_secs: i64,
}

#[derive(Clone)]
struct Snapshot {
    ts: DateTime<Utc>,
    problems: Arc<Vec<MergedProblem>>,
}

/// Owned problemset cache, shared through the application state
pub struct ProblemCache {
    snapshot: RwLock<Option<Snapshot>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SnapshotStore<CacheEnvelope>>,
    source: Arc<dyn CodeforcesApi>,
}

impl ProblemCache {
    pub fn new(
        ttl: Duration,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SnapshotStore<CacheEnvelope>>,
        source: Arc<dyn CodeforcesApi>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(None),
            ttl,
            clock,
            store,
            source,
        }
    }

    /// Best-effort load of the disk snapshot; returns the number of entries loaded
    pub async fn warm(&self) -> usize {
        match self.store.load().await {
            Ok(Some(envelope)) => {
                let count = envelope.problems.len();
                *self.snapshot.write().await = Some(Snapshot {
                    ts: envelope.ts,
                    problems: Arc::new(envelope.problems),
                });
                tracing::info!(count, ts = %envelope.ts, "Loaded problems cache from disk");
                count
            }
            Ok(None) => {
                tracing::debug!("No problems cache on disk yet");
                0
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load problems cache from disk");
                0
            }
        }
    }

    /// Serve the snapshot if fresh, otherwise fetch; fall back to a stale snapshot on failure
    pub async fn get(&self) -> AppResult<CacheRead> {
        let now = self.clock.now();
        let current = self.snapshot.read().await.clone();

        if let Some(snapshot) = &current {
            let age = now - snapshot.ts;
            if age < self.ttl {
                return Ok(CacheRead {
                    problems: snapshot.problems.clone(),
                    status: CacheStatus::Hit,
                    max_age_secs: (self.ttl - age).num_seconds().max(0),
                });
            }
        }

        match self.refresh().await {
            Ok(problems) => Ok(CacheRead {
                problems,
                status: CacheStatus::Miss,
                max_age_secs: self.ttl.num_seconds(),
            }),
            Err(e) => match current {
                Some(snapshot) => {
                    tracing::warn!(error = %e, "Problemset fetch failed, serving stale cache");
                    Ok(CacheRead {
                        problems: snapshot.problems,
                        status: CacheStatus::Stale,
                        max_age_secs: 0,
                    })
                }
                None => Err(e),
            },
        }
    }

    /// Fetch unconditionally and replace the snapshot
    ///
    /// The timestamp only moves when the fetch succeeds. A failed disk write
    /// is logged and does not fail the refresh.
    pub async fn refresh(&self) -> AppResult<Arc<Vec<MergedProblem>>> {
        let result = self.source.problemset().await.map_err(AppError::from)?;
        let merged = merge_with_stats(result.problems, &result.problem_statistics);
        let ts = self.clock.now();

        let envelope = CacheEnvelope { ts, problems: merged };
        if let Err(e) = self.store.save(&envelope).await {
            tracing::warn!(error = %e, "Failed to write problems cache to disk");
        } else {
            tracing::info!(count = envelope.problems.len(), "Problems cache written to disk");
        }

        let problems = Arc::new(envelope.problems);
        *self.snapshot.write().await = Some(Snapshot {
            ts,
            problems: problems.clone(),
        });

        Ok(problems)
    }

    /// Timestamp of the current snapshot
    pub async fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, MemoryStore};
    use crate::codeforces::{
        CfProblem, CfProblemStatistics, MockCodeforcesApi, ProblemsetResult, UpstreamError,
    };
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn problemset(names: &[&str]) -> ProblemsetResult {
        ProblemsetResult {
            problems: names
                .iter()
                .enumerate()
                .map(|(i, name)| CfProblem {
                    contest_id: Some(1),
                    problemset_name: None,
                    index: ((b'A' + i as u8) as char).to_string(),
                    name: name.to_string(),
                    problem_type: "PROGRAMMING".to_string(),
                    points: None,
                    rating: Some(800),
                    tags: vec![],
                })
                .collect(),
            problem_statistics: vec![CfProblemStatistics {
                contest_id: Some(1),
                index: "A".to_string(),
                solved_count: 10,
                attempt_count: Some(20),
            }],
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    struct Fixture {
        cache: ProblemCache,
        clock: Arc<ManualClock>,
        store: Arc<MemoryStore<CacheEnvelope>>,
        calls: Arc<AtomicUsize>,
    }

    /// Upstream answers `first` on the first call and fails afterwards when `then_fail`
    fn fixture(ttl: Duration, then_fail: bool) -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().returning(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n > 0 && then_fail {
                Err(UpstreamError::Timeout)
            } else {
                Ok(problemset(&[&format!("fetch {}", n)]))
            }
        });

        let clock = Arc::new(ManualClock::new(start()));
        let store = Arc::new(MemoryStore::new(None));
        let cache = ProblemCache::new(ttl, clock.clone(), store.clone(), Arc::new(api));

        Fixture {
            cache,
            clock,
            store,
            calls,
        }
    }

    #[tokio::test]
    async fn test_read_before_ttl_is_a_hit() {
        let ttl = Duration::seconds(3600);
        let f = fixture(ttl, false);

        let first = f.cache.get().await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.max_age_secs, 3600);

        f.clock.advance(ttl - Duration::seconds(1));
        let second = f.cache.get().await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.max_age_secs, 1);
        assert_eq!(second.problems, first.problems);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_after_ttl_refetches() {
        let ttl = Duration::seconds(3600);
        let f = fixture(ttl, false);

        f.cache.get().await.unwrap();
        f.clock.advance(ttl + Duration::seconds(1));

        let read = f.cache.get().await.unwrap();
        assert_eq!(read.status, CacheStatus::Miss);
        assert_eq!(read.problems[0].name, "fetch 1");
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
        assert_eq!(f.cache.timestamp().await, Some(start() + ttl + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_failed_fetch_serves_stale_and_keeps_timestamp() {
        let ttl = Duration::seconds(60);
        let f = fixture(ttl, true);

        f.cache.get().await.unwrap();
        f.clock.advance(Duration::seconds(120));

        let read = f.cache.get().await.unwrap();
        assert_eq!(read.status, CacheStatus::Stale);
        assert_eq!(read.max_age_secs, 0);
        assert_eq!(read.problems[0].name, "fetch 0");
        assert_eq!(f.cache.timestamp().await, Some(start()));
        assert_eq!(f.store.value.lock().unwrap().as_ref().unwrap().ts, start());
    }

    #[tokio::test]
    async fn test_failed_fetch_without_snapshot_is_an_error() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset()
            .returning(|| Err(UpstreamError::Failed("Call limit exceeded".into())));

        let cache = ProblemCache::new(
            Duration::seconds(60),
            Arc::new(ManualClock::new(start())),
            Arc::new(MemoryStore::new(None)),
            Arc::new(api),
        );

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(cache.timestamp().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_merges_and_persists() {
        let f = fixture(Duration::seconds(60), false);

        let problems = f.cache.refresh().await.unwrap();
        assert_eq!(problems[0].acceptance_percent, Some(50));

        let saved = f.store.value.lock().unwrap().clone().unwrap();
        assert_eq!(saved.ts, start());
        assert_eq!(saved.problems.len(), 1);
    }

    #[tokio::test]
    async fn test_disk_write_failure_does_not_fail_refresh() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().returning(|| Ok(problemset(&["only"])));
        let mut store = MemoryStore::new(None);
        store.fail_saves = true;

        let cache = ProblemCache::new(
            Duration::seconds(60),
            Arc::new(ManualClock::new(start())),
            Arc::new(store),
            Arc::new(api),
        );

        assert_eq!(cache.refresh().await.unwrap().len(), 1);
        assert_eq!(cache.timestamp().await, Some(start()));
    }

    #[tokio::test]
    async fn test_warm_loads_disk_snapshot() {
        let envelope = CacheEnvelope {
            ts: start(),
            problems: merge_with_stats(problemset(&["from disk"]).problems, &[]),
        };
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().never();

        let clock = Arc::new(ManualClock::new(start() + Duration::seconds(10)));
        let cache = ProblemCache::new(
            Duration::seconds(60),
            clock,
            Arc::new(MemoryStore::new(Some(envelope))),
            Arc::new(api),
        );

        assert_eq!(cache.warm().await, 1);
        let read = cache.get().await.unwrap();
        assert_eq!(read.status, CacheStatus::Hit);
        assert_eq!(read.max_age_secs, 50);
        assert_eq!(read.problems[0].name, "from disk");
    }

    #[test]
    fn test_envelope_uses_millisecond_timestamp() {
        let envelope = CacheEnvelope {
            ts: start(),
            problems: vec![],
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["ts"], serde_json::json!(start().timestamp_millis()));
    }
}
