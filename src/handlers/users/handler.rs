//! User progress handler implementations

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{error::AppResult, services::ProgressService, state::AppState};

use super::response::{ForgetProgressResponse, UserProgressResponse};

/// Pull the handle's history from Codeforces and store it
pub async fn sync_user(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<UserProgressResponse>> {
    let progress = ProgressService::sync(&state, &handle).await?;
    Ok(Json(progress))
}

/// Stored progress
pub async fn get_user(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<UserProgressResponse>> {
    let progress = ProgressService::get(&state, &handle).await?;
    Ok(Json(progress))
}

/// Forget stored progress
pub async fn delete_user(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<ForgetProgressResponse>> {
    let result = ProgressService::forget(&state, &handle).await?;
    Ok(Json(result))
}
