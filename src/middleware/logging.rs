//! Logging middleware

use axum::{
    body::Body,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

use crate::constants::CACHE_STATUS_HEADER;

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method: Method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);
    let status = response.status();
    let cache = response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "Request completed with server error"
        );
    } else if status.is_client_error() && status != StatusCode::NOT_FOUND {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = %duration_ms,
            "Request completed with client error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            cache = %cache,
            duration_ms = %duration_ms,
            "Request completed"
        );
    }

    response
}
