//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod contests;
pub mod health;
pub mod ladder;
pub mod problems;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/contests", contests::routes())
        .nest("/problems", problems::routes(state))
        .nest("/ladder", ladder::routes())
        .nest("/users", users::routes())
}
