//! Health check handlers

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Connection state of the contest store
    pub db_state: String,
    pub sync_strategy: String,
    /// When the problemset cache was last filled
    pub problems_cached_at: Option<DateTime<Utc>>,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_state = match db::test_connection(state.db()).await {
        Ok(()) => "connected".to_string(),
        Err(_) => db::pool_state(state.db()).to_string(),
    };
    let status = if db_state == "connected" { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        db_state,
        sync_strategy: state.config().sync.strategy.as_str().to_string(),
        problems_cached_at: state.problems().timestamp().await,
    })
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
