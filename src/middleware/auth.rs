//! Refresh-secret middleware
//!
//! Guards the force-refresh route. When a secret is configured the caller
//! must present it in the `x-refresh-secret` header, the `secret` query
//! parameter, or a `secret` field of a JSON body, checked in that order.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Query, Request, State},
    http::{HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::{constants::REFRESH_SECRET_HEADER, error::AppError};

/// Largest body read while looking for a secret
const MAX_SECRET_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug, Deserialize)]
struct SecretField {
    secret: Option<String>,
}

/// Secret from the header or the query string
fn secret_from_parts(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(REFRESH_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            Query::<SecretField>::try_from_uri(uri)
                .ok()
                .and_then(|Query(q)| q.secret)
        })
}

/// Secret from a JSON body; anything unparsable counts as absent
fn secret_from_body(body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<SecretField>(body)
        .ok()
        .and_then(|b| b.secret)
}

/// Reject the request with 401 unless it carries the configured secret
///
/// The body is only buffered when neither the header nor the query string
/// holds a secret.
pub async fn refresh_secret_middleware(
    State(secret): State<Option<String>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = secret else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();
    let (provided, body) = match secret_from_parts(&parts.headers, &parts.uri) {
        Some(secret) => (Some(secret), body),
        None => {
            let bytes = to_bytes(body, MAX_SECRET_BODY_BYTES)
                .await
                .map_err(|_| AppError::InvalidInput("Request body too large".to_string()))?;
            (secret_from_body(&bytes), Body::from(bytes))
        }
    };

    if provided.as_deref() != Some(expected.as_str()) {
        debug!(path = %parts.uri.path(), present = provided.is_some(), "Refresh rejected: secret mismatch");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json, Router,
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        cache::{CacheEnvelope, ManualClock, MemoryStore, ProblemCache},
        codeforces::{MockCodeforcesApi, ProblemsetResult},
    };

    fn cached_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    /// Cache already holding a snapshot taken at `cached_at`
    async fn warmed_cache(api: MockCodeforcesApi) -> Arc<ProblemCache> {
        let store = MemoryStore::new(Some(CacheEnvelope {
            ts: cached_at(),
            problems: vec![],
        }));
        let cache = ProblemCache::new(
            chrono::Duration::hours(1),
            Arc::new(ManualClock::new(cached_at() + chrono::Duration::hours(2))),
            Arc::new(store),
            Arc::new(api),
        );
        cache.warm().await;
        Arc::new(cache)
    }

    async fn refresh(State(cache): State<Arc<ProblemCache>>) -> Result<Json<usize>, AppError> {
        Ok(Json(cache.refresh().await?.len()))
    }

    fn guarded(cache: Arc<ProblemCache>, secret: Option<&str>) -> Router {
        Router::new()
            .route(
                "/refresh",
                post(refresh).route_layer(from_fn_with_state(
                    secret.map(str::to_string),
                    refresh_secret_middleware,
                )),
            )
            .with_state(cache)
    }

    fn refresh_request(header: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/refresh");
        if let Some(value) = header {
            builder = builder.header(REFRESH_SECRET_HEADER, value);
        }
        builder.body(body).unwrap()
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected_and_cache_untouched() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().never();
        let cache = warmed_cache(api).await;

        let response = guarded(cache.clone(), Some("s3cret"))
            .oneshot(refresh_request(Some("guess"), Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(cache.timestamp().await, Some(cached_at()));
    }

    #[tokio::test]
    async fn test_missing_secret_is_rejected() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().never();
        let cache = warmed_cache(api).await;

        let response = guarded(cache.clone(), Some("s3cret"))
            .oneshot(refresh_request(None, Body::from(r#"{"secret":"nope"}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(cache.timestamp().await, Some(cached_at()));
    }

    #[tokio::test]
    async fn test_matching_body_secret_refreshes() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().times(1).returning(|| {
            Ok(ProblemsetResult {
                problems: vec![],
                problem_statistics: vec![],
            })
        });
        let cache = warmed_cache(api).await;

        let response = guarded(cache.clone(), Some("s3cret"))
            .oneshot(refresh_request(None, Body::from(r#"{"secret":"s3cret"}"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            cache.timestamp().await,
            Some(cached_at() + chrono::Duration::hours(2))
        );
    }

    #[tokio::test]
    async fn test_header_secret_skips_body_limit() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().times(1).returning(|| {
            Ok(ProblemsetResult {
                problems: vec![],
                problem_statistics: vec![],
            })
        });
        let cache = warmed_cache(api).await;

        let large = vec![b'x'; MAX_SECRET_BODY_BYTES * 2];
        let response = guarded(cache, Some("s3cret"))
            .oneshot(refresh_request(Some("s3cret"), Body::from(large)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_no_secret_configured_leaves_route_open() {
        let mut api = MockCodeforcesApi::new();
        api.expect_problemset().times(1).returning(|| {
            Ok(ProblemsetResult {
                problems: vec![],
                problem_statistics: vec![],
            })
        });
        let cache = warmed_cache(api).await;

        let response = guarded(cache, None)
            .oneshot(refresh_request(None, Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(REFRESH_SECRET_HEADER, HeaderValue::from_static("from-header"));
        let uri: Uri = "/api/problems/refresh?secret=from-query".parse().unwrap();

        assert_eq!(secret_from_parts(&headers, &uri).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_query_secret() {
        let uri: Uri = "/api/problems/refresh?secret=s3cret".parse().unwrap();
        assert_eq!(secret_from_parts(&HeaderMap::new(), &uri).as_deref(), Some("s3cret"));

        let uri: Uri = "/api/problems/refresh".parse().unwrap();
        assert_eq!(secret_from_parts(&HeaderMap::new(), &uri), None);
    }

    #[test]
    fn test_body_secret() {
        assert_eq!(
            secret_from_body(&Bytes::from_static(br#"{"secret":"abc"}"#)).as_deref(),
            Some("abc")
        );
        assert_eq!(secret_from_body(&Bytes::from_static(b"not json")), None);
        assert_eq!(secret_from_body(&Bytes::new()), None);
    }
}
