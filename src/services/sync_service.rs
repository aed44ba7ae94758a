//! Contest sync service
//!
//! Pulls new contests from Codeforces into the store. Two policies exist and
//! exactly one is active per process:
//!
//! - watermark: list every contest upstream and keep finished ones that
//!   started after the newest stored contest, then fetch their problems one
//!   at a time with a pause between calls
//! - probe: ask for ids above the highest stored id through a small ordered
//!   worker pool until enough ids in a row come back empty
//!
//! The probe policy is best-effort. A transient upstream error counts as a
//! missing id, so a flaky upstream can end the run early and a contest
//! published out of id order can be skipped until the next run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;

use crate::{
    cache::SyncSnapshot,
    codeforces::{CfContest, CodeforcesApi, ContestPhase, StandingsResult},
    config::{SyncConfig, SyncStrategy},
    db::{ensure_ready, repositories::ContestRepository},
    error::{AppError, AppResult},
    handlers::contests::response::{RefreshContestResponse, SyncReport},
    models::{NewContest, Problem},
    state::AppState,
    utils::format_duration,
};

/// Contest sync service
pub struct SyncService;

impl SyncService {
    /// Run the configured sync policy
    pub async fn sync(state: &AppState) -> AppResult<SyncReport> {
        ensure_ready(state.db()).await?;

        let started = Utc::now();
        let settings = &state.config().sync;
        tracing::info!(strategy = settings.strategy.as_str(), "Starting contest sync");

        let discovered = match settings.strategy {
            SyncStrategy::Watermark => Self::discover_by_watermark(state, settings).await?,
            SyncStrategy::Probe => {
                let start_id = ContestRepository::max_id(state.db()).await? + 1;
                tracing::info!(start_id, "Probing for new contest ids");
                probe_contests(state.codeforces(), start_id, settings, Utc::now()).await
            }
        };

        if discovered.is_empty() {
            tracing::info!("Already up to date, no new contests found");
            return Ok(SyncReport {
                success: true,
                strategy: settings.strategy.as_str().to_string(),
                message: Some("Already up to date".to_string()),
                ..Default::default()
            });
        }

        let (inserted, updated) = match settings.strategy {
            SyncStrategy::Watermark => Self::insert_or_update(state, &discovered).await?,
            SyncStrategy::Probe => Self::upsert_all(state, &discovered).await?,
        };

        let total_problems = discovered.iter().map(|c| c.problems.len()).sum();
        let new_contests_count = discovered.len();

        let snapshot = SyncSnapshot::new(discovered, Utc::now());
        if let Err(e) = state.sync_snapshots().save(&snapshot).await {
            tracing::warn!(error = %e, "Failed to write sync snapshot");
        }

        tracing::info!(
            inserted,
            updated,
            total_problems,
            processed = new_contests_count,
            elapsed = %format_duration(Utc::now() - started),
            "Contest sync finished"
        );

        Ok(SyncReport {
            success: true,
            contests_inserted: inserted,
            contests_updated: updated,
            total_problems,
            new_contests_count,
            strategy: settings.strategy.as_str().to_string(),
            message: None,
        })
    }

    async fn discover_by_watermark(state: &AppState, settings: &SyncConfig) -> AppResult<Vec<NewContest>> {
        let pool = state.db();
        let watermark = ContestRepository::latest_start_time(pool).await?;
        tracing::info!(watermark, "Fetching contest list");

        let listed = state.codeforces().contest_list().await?;
        let candidates = select_new_contests(listed, watermark);

        let ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
        let existing = ContestRepository::existing_ids(pool, &ids).await?;
        let candidates: Vec<CfContest> = candidates
            .into_iter()
            .filter(|c| !existing.contains(&c.id))
            .collect();

        tracing::info!(count = candidates.len(), "New finished contests to fetch");

        Ok(fetch_problems_serially(state.codeforces(), candidates, settings.request_delay, Utc::now()).await)
    }

    /// Update contests that already exist, batch-insert the rest
    async fn insert_or_update(state: &AppState, contests: &[NewContest]) -> AppResult<(u64, u64)> {
        let pool = state.db();
        let mut updated = 0;
        let mut to_insert = Vec::new();

        for contest in contests {
            if ContestRepository::update(pool, contest).await? {
                updated += 1;
            } else {
                to_insert.push(contest.clone());
            }
        }

        let inserted = ContestRepository::insert_many(pool, &to_insert).await?;
        Ok((inserted, updated))
    }

    async fn upsert_all(state: &AppState, contests: &[NewContest]) -> AppResult<(u64, u64)> {
        let (mut inserted, mut updated) = (0, 0);

        for contest in contests {
            if ContestRepository::upsert(state.db(), contest).await?.inserted {
                inserted += 1;
            } else {
                updated += 1;
            }
        }

        Ok((inserted, updated))
    }

    /// Re-fetch one contest and replace the stored copy
    pub async fn refresh_contest(state: &AppState, contest_id: i64) -> AppResult<RefreshContestResponse> {
        ensure_ready(state.db()).await?;

        let contest = build_refreshed_contest(state.codeforces(), contest_id, Utc::now()).await?;
        let problems_count = contest.problems.len();

        let stored = ContestRepository::upsert(state.db(), &contest).await?;
        tracing::info!(contest_id, problems_count, "Contest refreshed");

        Ok(RefreshContestResponse {
            success: true,
            contest: stored.contest,
            problems_count,
        })
    }
}

/// Finished contests that started strictly after `watermark`
pub fn select_new_contests(listed: Vec<CfContest>, watermark: i64) -> Vec<CfContest> {
    listed
        .into_iter()
        .filter(|c| c.phase == ContestPhase::Finished)
        .filter(|c| c.start_time_seconds.is_some_and(|start| start > watermark))
        .collect()
}

fn problems_of(standings: StandingsResult, contest_id: i64) -> Vec<Problem> {
    standings
        .problems
        .into_iter()
        .map(|p| Problem::from_upstream(p, contest_id))
        .collect()
}

/// Fetch each contest's problems one at a time, pausing `delay` between calls
///
/// A failed fetch is logged and the contest is kept with no problems.
pub async fn fetch_problems_serially(
    api: &dyn CodeforcesApi,
    contests: Vec<CfContest>,
    delay: Duration,
    synced_at: DateTime<Utc>,
) -> Vec<NewContest> {
    let mut fetched = Vec::with_capacity(contests.len());

    for (i, contest) in contests.into_iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let problems = match api.contest_standings(contest.id).await {
            Ok(standings) => problems_of(standings, contest.id),
            Err(e) => {
                tracing::warn!(contest_id = contest.id, error = %e, "Failed to fetch contest problems");
                Vec::new()
            }
        };
        tracing::debug!(contest_id = contest.id, problems = problems.len(), "Fetched contest");

        fetched.push(NewContest::from_upstream(contest, problems, synced_at));
    }

    fetched
}

/// Probe ids from `start_id` upward and collect the finished contests found
///
/// Requests run through an ordered pool of `probe_concurrency`. Every error
/// counts as a miss. The run stops after `probe_max_consecutive_misses`
/// misses in a row or `probe_max_ids` ids. An unfinished contest proves the
/// id exists and resets the miss run, but it is not returned.
pub async fn probe_contests(
    api: &dyn CodeforcesApi,
    start_id: i64,
    settings: &SyncConfig,
    synced_at: DateTime<Utc>,
) -> Vec<NewContest> {
    let end_id = start_id + i64::from(settings.probe_max_ids);
    let mut responses = futures::stream::iter(start_id..end_id)
        .map(move |id| async move { (id, api.contest_standings(id).await) })
        .buffered(settings.probe_concurrency.max(1));

    let mut found = Vec::new();
    let mut misses = 0;
    let mut probed = 0;

    while let Some((id, response)) = responses.next().await {
        probed += 1;
        match response {
            Ok(StandingsResult { contest, problems }) if contest.phase == ContestPhase::Finished => {
                misses = 0;
                let problems: Vec<Problem> = problems
                    .into_iter()
                    .map(|p| Problem::from_upstream(p, id))
                    .collect();
                tracing::info!(contest_id = id, problems = problems.len(), "Found contest");
                found.push(NewContest::from_upstream(contest, problems, synced_at));
            }
            Ok(standings) => {
                misses = 0;
                tracing::debug!(contest_id = id, phase = %standings.contest.phase, "Skipping unfinished contest");
            }
            Err(e) => {
                misses += 1;
                tracing::debug!(contest_id = id, error = %e, misses, "No contest at id");
                if misses >= settings.probe_max_consecutive_misses {
                    break;
                }
            }
        }
    }

    tracing::info!(probed, found = found.len(), "Probing complete");
    found
}

/// Look a contest up upstream and rebuild it with fresh problems
///
/// An API-level failure on the standings call yields an empty problem list;
/// a transport failure aborts.
pub async fn build_refreshed_contest(
    api: &dyn CodeforcesApi,
    contest_id: i64,
    synced_at: DateTime<Utc>,
) -> AppResult<NewContest> {
    let contest = api
        .contest_list()
        .await?
        .into_iter()
        .find(|c| c.id == contest_id)
        .ok_or_else(|| AppError::NotFound("Contest not found on Codeforces".to_string()))?;

    let problems = match api.contest_standings(contest_id).await {
        Ok(standings) => problems_of(standings, contest_id),
        Err(e) if e.is_api_answer() => {
            tracing::warn!(contest_id, error = %e, "Standings unavailable, storing contest without problems");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(NewContest::from_upstream(contest, problems, synced_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codeforces::{CfProblem, MockCodeforcesApi, UpstreamError};
    use chrono::TimeZone;

    fn cf_contest(id: i64, phase: ContestPhase, start: Option<i64>) -> CfContest {
        CfContest {
            id,
            name: format!("Codeforces Round {}", id),
            contest_type: "CF".into(),
            phase,
            frozen: false,
            duration_seconds: 7200,
            start_time_seconds: start,
            relative_time_seconds: None,
            prepared_by: None,
            website_url: None,
            description: None,
            difficulty: None,
            kind: None,
            icpc_region: None,
            country: None,
            city: None,
            season: None,
        }
    }

    fn cf_problem(index: &str) -> CfProblem {
        CfProblem {
            contest_id: None,
            problemset_name: None,
            index: index.to_string(),
            name: format!("Problem {}", index),
            problem_type: "PROGRAMMING".into(),
            points: None,
            rating: None,
            tags: vec![],
        }
    }

    fn standings(id: i64, phase: ContestPhase, indexes: &[&str]) -> StandingsResult {
        StandingsResult {
            contest: cf_contest(id, phase, Some(1_000 + id)),
            problems: indexes.iter().map(|i| cf_problem(i)).collect(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn probe_settings(misses: u32, max_ids: u32) -> SyncConfig {
        SyncConfig {
            strategy: SyncStrategy::Probe,
            request_delay: Duration::ZERO,
            probe_concurrency: 5,
            probe_max_consecutive_misses: misses,
            probe_max_ids: max_ids,
        }
    }

    #[test]
    fn test_select_new_contests_filters_phase_and_watermark() {
        let listed = vec![
            cf_contest(1, ContestPhase::Finished, Some(100)),
            cf_contest(2, ContestPhase::Finished, Some(200)),
            cf_contest(3, ContestPhase::Coding, Some(300)),
            cf_contest(4, ContestPhase::Before, Some(400)),
            cf_contest(5, ContestPhase::Finished, None),
            cf_contest(6, ContestPhase::Finished, Some(150)),
        ];

        let ids: Vec<i64> = select_new_contests(listed, 150).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_select_new_contests_empty_store() {
        let listed = vec![cf_contest(1, ContestPhase::Finished, Some(100))];
        assert_eq!(select_new_contests(listed, 0).len(), 1);
    }

    #[tokio::test]
    async fn test_serial_fetch_sorts_problems_and_tolerates_failures() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_standings().returning(|id| {
            if id == 2 {
                Err(UpstreamError::Timeout)
            } else {
                Ok(standings(id, ContestPhase::Finished, &["C", "A", "B"]))
            }
        });

        let contests = vec![
            cf_contest(1, ContestPhase::Finished, Some(10)),
            cf_contest(2, ContestPhase::Finished, Some(20)),
        ];
        let fetched = fetch_problems_serially(&api, contests, Duration::ZERO, now()).await;

        assert_eq!(fetched.len(), 2);
        let order: Vec<&str> = fetched[0].problems.iter().map(|p| p.index.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(fetched[0].problems.iter().all(|p| p.contest_id == 1));
        assert!(fetched[1].problems.is_empty());
        assert_eq!(fetched[1].last_synced, now());
    }

    #[tokio::test]
    async fn test_probe_stops_after_consecutive_misses() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_standings().returning(|id| match id {
            100 | 101 => Ok(standings(id, ContestPhase::Finished, &["B", "A"])),
            102 => Ok(standings(id, ContestPhase::Coding, &["A"])),
            _ => Err(UpstreamError::NotFound(format!("contestId: Contest with id {} not found", id))),
        });

        let found = probe_contests(&api, 100, &probe_settings(3, 200), now()).await;

        let ids: Vec<i64> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(found[0].problems[0].index, "A");
    }

    #[tokio::test]
    async fn test_probe_transient_error_counts_as_miss() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_standings().returning(|id| match id {
            10 => Err(UpstreamError::Timeout),
            11 => Ok(standings(id, ContestPhase::Finished, &["A"])),
            _ => Err(UpstreamError::NotFound("not found".into())),
        });

        // one miss budget: the timeout at id 10 ends the run before 11 is seen
        let found = probe_contests(&api, 10, &probe_settings(1, 200), now()).await;
        assert!(found.is_empty());

        let found = probe_contests(&api, 10, &probe_settings(2, 200), now()).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 11);
    }

    #[tokio::test]
    async fn test_probe_respects_id_cap() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_standings()
            .times(4)
            .returning(|id| Ok(standings(id, ContestPhase::Finished, &["A"])));

        let found = probe_contests(&api, 1, &probe_settings(10, 4), now()).await;
        assert_eq!(found.len(), 4);
    }

    #[tokio::test]
    async fn test_refresh_unknown_contest_is_not_found() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_list()
            .returning(|| Ok(vec![cf_contest(1, ContestPhase::Finished, Some(10))]));
        api.expect_contest_standings().never();

        let err = build_refreshed_contest(&api, 999, now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Contest not found on Codeforces"));
    }

    #[tokio::test]
    async fn test_refresh_failed_standings_yields_empty_problems() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_list()
            .returning(|| Ok(vec![cf_contest(7, ContestPhase::Finished, Some(10))]));
        api.expect_contest_standings()
            .returning(|_| Err(UpstreamError::Failed("contestId: Contest 7 has not started".into())));

        let contest = build_refreshed_contest(&api, 7, now()).await.unwrap();
        assert_eq!(contest.id, 7);
        assert!(contest.problems.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_aborts() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_list()
            .returning(|| Ok(vec![cf_contest(7, ContestPhase::Finished, Some(10))]));
        api.expect_contest_standings()
            .returning(|_| Err(UpstreamError::Status { status: 503 }));

        let err = build_refreshed_contest(&api, 7, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_refresh_sorts_problems() {
        let mut api = MockCodeforcesApi::new();
        api.expect_contest_list()
            .returning(|| Ok(vec![cf_contest(7, ContestPhase::Finished, Some(10))]));
        api.expect_contest_standings()
            .returning(|id| Ok(standings(id, ContestPhase::Finished, &["D", "B1", "A"])));

        let contest = build_refreshed_contest(&api, 7, now()).await.unwrap();
        let order: Vec<&str> = contest.problems.iter().map(|p| p.index.as_str()).collect();
        assert_eq!(order, vec!["A", "B1", "D"]);
    }
}
