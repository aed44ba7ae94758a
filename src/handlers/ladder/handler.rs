//! Ladder handler implementations

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::{error::AppResult, services::LadderService, state::AppState};

use super::{request::LadderQuery, response::LadderResponse};

/// One page of the ladder for a rating
pub async fn get_ladder(
    State(state): State<AppState>,
    Query(query): Query<LadderQuery>,
) -> AppResult<Json<LadderResponse>> {
    query.validate()?;

    let ladder = LadderService::ladder(&state, query).await?;
    Ok(Json(ladder))
}
