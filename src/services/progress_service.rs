//! User progress service
//!
//! Solved sets are advisory: they are rebuilt from the upstream submission
//! history on demand and only ever grow.

use std::collections::BTreeSet;

use crate::{
    codeforces::CodeforcesApi,
    constants::MAX_ATTEMPTED_UNSOLVED,
    db::repositories::ProgressRepository,
    error::{AppError, AppResult},
    handlers::users::response::{ForgetProgressResponse, UserProgressResponse},
    models::{
        AttemptedProblem, MergedProblem, SolvedKey, UserInfo, accepted_keys, attempted_unsolved, merge_solved,
    },
    state::AppState,
    utils::normalize_handle,
};

/// Result of pulling a handle's history from upstream
#[derive(Debug)]
pub struct FetchedProgress {
    /// Stored keys merged with the freshly accepted ones
    pub solved: BTreeSet<SolvedKey>,
    /// Keys not stored before
    pub new_keys: Vec<SolvedKey>,
    /// Attempted problems missing from `solved`
    pub attempted: Vec<AttemptedProblem>,
    /// Fresh profile, `None` when the profile call failed
    pub info: Option<UserInfo>,
}

/// User progress service
pub struct ProgressService;

impl ProgressService {
    /// Pull a handle's accepted submissions and profile and store them
    pub async fn sync(state: &AppState, raw_handle: &str) -> AppResult<UserProgressResponse> {
        let handle = parse_handle(raw_handle)?;
        let mut redis = state.redis();

        let stored = ProgressRepository::solved(&mut redis, &handle).await?;
        let fetched = fetch_progress(state.codeforces(), &handle, &stored).await?;
        let added = ProgressRepository::add_solved(&mut redis, &handle, &fetched.new_keys).await?;
        ProgressRepository::set_attempted(&mut redis, &handle, &fetched.attempted).await?;

        let info = match fetched.info {
            Some(info) => {
                let ttl = state.config().redis.info_ttl_secs;
                ProgressRepository::set_info(&mut redis, &handle, &info, ttl).await?;
                Some(info)
            }
            None => ProgressRepository::info(&mut redis, &handle).await?,
        };

        tracing::info!(handle = %handle, solved = fetched.solved.len(), added, "User progress synced");

        let unsolved_count = Self::unsolved_against_cache(state, &fetched.solved).await;
        Ok(UserProgressResponse {
            success: true,
            handle,
            info,
            solved_count: fetched.solved.len(),
            unsolved_count,
            newly_solved: added,
            solved: fetched.solved,
            attempted_unsolved: fetched.attempted,
        })
    }

    /// Stored progress without calling upstream
    pub async fn get(state: &AppState, raw_handle: &str) -> AppResult<UserProgressResponse> {
        let handle = parse_handle(raw_handle)?;
        let mut redis = state.redis();

        let solved = ProgressRepository::solved(&mut redis, &handle).await?;
        let info = ProgressRepository::info(&mut redis, &handle).await?;
        let attempted: Vec<AttemptedProblem> = ProgressRepository::attempted(&mut redis, &handle)
            .await?
            .into_iter()
            .filter(|p| !solved.contains(&p.key()))
            .collect();

        if solved.is_empty() && info.is_none() && attempted.is_empty() {
            return Err(AppError::NotFound(format!("No stored progress for {}", handle)));
        }

        let unsolved_count = Self::unsolved_against_cache(state, &solved).await;
        Ok(UserProgressResponse {
            success: true,
            handle,
            info,
            solved_count: solved.len(),
            unsolved_count,
            newly_solved: 0,
            solved,
            attempted_unsolved: attempted,
        })
    }

    /// Drop everything stored for a handle
    pub async fn forget(state: &AppState, raw_handle: &str) -> AppResult<ForgetProgressResponse> {
        let handle = parse_handle(raw_handle)?;
        let mut redis = state.redis();

        let removed = ProgressRepository::clear(&mut redis, &handle).await?;
        tracing::info!(handle = %handle, removed, "User progress cleared");

        Ok(ForgetProgressResponse {
            success: true,
            handle,
            removed,
        })
    }

    /// Unsolved rated problems, `None` when the problemset is unavailable
    async fn unsolved_against_cache(state: &AppState, solved: &BTreeSet<SolvedKey>) -> Option<usize> {
        match state.problems().get().await {
            Ok(read) => Some(unsolved_count(&read.problems, solved)),
            Err(e) => {
                tracing::warn!(error = %e, "Problemset unavailable for unsolved count");
                None
            }
        }
    }
}

fn parse_handle(raw: &str) -> AppResult<String> {
    normalize_handle(raw).map_err(|e| AppError::Validation(e.to_string()))
}

/// Fetch accepted submissions and the profile for `handle`
///
/// A failed submission fetch aborts. A failed profile fetch is logged and
/// reported as `info: None` so the caller can keep its stored snapshot.
pub async fn fetch_progress(
    api: &dyn CodeforcesApi,
    handle: &str,
    stored: &BTreeSet<SolvedKey>,
) -> AppResult<FetchedProgress> {
    let submissions = api.user_status(handle).await?;
    let solved = merge_solved(stored, accepted_keys(&submissions));
    let new_keys = solved.difference(stored).cloned().collect();
    let attempted = attempted_unsolved(&submissions, &solved, MAX_ATTEMPTED_UNSOLVED);

    let info = match api.user_info(handle).await {
        Ok(user) => Some(UserInfo::from(user)),
        Err(e) => {
            tracing::warn!(handle, error = %e, "Failed to fetch user info, keeping stored profile");
            None
        }
    };

    Ok(FetchedProgress {
        solved,
        new_keys,
        attempted,
        info,
    })
}

/// Rated problems whose key is not in `solved`
pub fn unsolved_count(problems: &[MergedProblem], solved: &BTreeSet<SolvedKey>) -> usize {
    problems
        .iter()
        .filter(|p| p.is_rated())
        .filter(|p| p.key().is_none_or(|k| !solved.contains(&k)))
        .count()
}
