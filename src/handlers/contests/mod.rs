//! Contest handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Contest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_contests))
        .route("/by-category", get(handler::contests_by_category))
        // Sync
        .route("/sync", post(handler::sync_contests))
        .route("/sync/status", get(handler::sync_status))
        // Aggregates
        .route("/stats/overview", get(handler::stats_overview))
        .route("/problems/all", get(handler::search_problems))
        // Single contest
        .route("/{id}", get(handler::get_contest))
        .route("/{id}/refresh", post(handler::refresh_contest))
}
