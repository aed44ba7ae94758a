//! User progress handlers

mod handler;
pub mod response;

pub use handler::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// User progress routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{handle}", get(handler::get_user).delete(handler::delete_user))
        .route("/{handle}/sync", post(handler::sync_user))
}
