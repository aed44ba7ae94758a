//! Problemset handler implementations

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderName, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};

use crate::{
    constants::CACHE_STATUS_HEADER,
    error::AppResult,
    services::ProblemService,
    state::AppState,
};

use super::{
    request::ListProblemsQuery,
    response::{RefreshProblemsResponse, TagCountsResponse},
};

/// Cached problemset; rated problems only unless `all=true`
pub async fn list_problems(
    State(state): State<AppState>,
    Query(query): Query<ListProblemsQuery>,
) -> AppResult<Response> {
    let read = state.problems().get().await?;
    let problems = ProblemService::select(&read.problems, query.all);

    let headers = [
        (HeaderName::from_static(CACHE_STATUS_HEADER), read.status.as_str().to_string()),
        (CACHE_CONTROL, format!("public, max-age={}", read.max_age_secs)),
    ];
    Ok((headers, Json(problems)).into_response())
}

/// Refetch the problemset now
pub async fn refresh_problems(State(state): State<AppState>) -> AppResult<Json<RefreshProblemsResponse>> {
    let response = ProblemService::refresh(&state).await?;
    Ok(Json(response))
}

/// Tag counts over rated problems
pub async fn tag_counts(State(state): State<AppState>) -> AppResult<Json<TagCountsResponse>> {
    let response = ProblemService::tag_counts(&state).await?;
    Ok(Json(response))
}
