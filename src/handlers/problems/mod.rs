//! Problemset handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{middleware::refresh_secret_middleware, state::AppState};

/// Problemset routes
///
/// The refresh route is guarded by the refresh secret when one is configured.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_problems))
        .route("/tags", get(handler::tag_counts))
        .route(
            "/refresh",
            post(handler::refresh_problems)
                .route_layer(middleware::from_fn_with_state(
                    state.config().refresh.secret.clone(),
                    refresh_secret_middleware,
                )),
        )
}
