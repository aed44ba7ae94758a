//! Contest handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::{
    error::AppResult,
    services::{ContestService, SyncService},
    state::AppState,
};

use super::{
    request::{ByCategoryQuery, ListContestsQuery, ProblemSearchQuery},
    response::{
        ContestResponse, ContestStatsResponse, ContestsByCategoryResponse, ContestsListResponse,
        ProblemSearchResponse, RefreshContestResponse, SyncReport, SyncStatusResponse,
    },
};

/// List contests (with filtering)
pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<ListContestsQuery>,
) -> AppResult<Json<ContestsListResponse>> {
    query.validate()?;

    let contests = ContestService::list_contests(state.db(), &query).await?;
    Ok(Json(contests))
}

/// Contests grouped by division and series
pub async fn contests_by_category(
    State(state): State<AppState>,
    Query(query): Query<ByCategoryQuery>,
) -> AppResult<Json<ContestsByCategoryResponse>> {
    query.validate()?;

    let grouped = ContestService::contests_by_category(state.db(), query.limit).await?;
    Ok(Json(grouped))
}

/// Pull new contests from Codeforces
pub async fn sync_contests(State(state): State<AppState>) -> AppResult<Json<SyncReport>> {
    let report = SyncService::sync(&state).await?;
    Ok(Json(report))
}

/// Whether a sync is due
pub async fn sync_status(State(state): State<AppState>) -> AppResult<Json<SyncStatusResponse>> {
    let status = ContestService::sync_status(state.db(), state.config().cache.contests_ttl).await?;
    Ok(Json(status))
}

/// Most recent contests with problem counts
pub async fn stats_overview(State(state): State<AppState>) -> AppResult<Json<ContestStatsResponse>> {
    let stats = ContestService::stats_overview(state.db()).await?;
    Ok(Json(stats))
}

/// Problems across all stored contests
pub async fn search_problems(
    State(state): State<AppState>,
    Query(query): Query<ProblemSearchQuery>,
) -> AppResult<Json<ProblemSearchResponse>> {
    query.validate()?;

    let problems = ContestService::search_problems(state.db(), &query).await?;
    Ok(Json(problems))
}

/// Get contest by ID
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ContestResponse>> {
    let contest = ContestService::get_contest(state.db(), id).await?;
    Ok(Json(contest))
}

/// Re-fetch one contest from Codeforces
pub async fn refresh_contest(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RefreshContestResponse>> {
    let refreshed = SyncService::refresh_contest(&state, id).await?;
    Ok(Json(refreshed))
}
