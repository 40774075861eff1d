//! Per-client rate limiting middleware
//!
//! Adds `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset` to
//! every response, and answers `429` once a client exhausts its window.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use kernel::error::app_error::AppError;
use platform::client::ClientIp;
use platform::rate_limit::{
    InMemoryRateLimitStore, RateLimitConfig, RateLimitResult, RateLimitStore,
};

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// How often expired windows are dropped from the in-memory store
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct RateLimitState<S> {
    pub store: S,
    pub config: Arc<RateLimitConfig>,
}

impl<S> RateLimitState<S> {
    pub fn new(store: S, config: RateLimitConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub async fn rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Clone + Send + Sync + 'static,
{
    let key = client_ip.key();

    let result = match state.store.check_and_increment(&key, &state.config).await {
        Ok(result) => result,
        Err(e) => {
            // Store failure should not take the API down
            tracing::error!(error = %e, "Rate limit store failed, allowing request");
            return next.run(req).await;
        }
    };

    let mut response = if result.allowed {
        next.run(req).await
    } else {
        tracing::warn!(client = %key, limit = result.limit, "Rate limit exceeded");
        AppError::too_many_requests("Too many requests, please try again later")
            .into_response()
    };

    apply_headers(response.headers_mut(), &result, Utc::now().timestamp_millis());
    response
}

fn apply_headers(headers: &mut HeaderMap, result: &RateLimitResult, now_ms: i64) {
    let reset_secs = result.reset_after_secs(now_ms);

    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(reset_secs));
    if !result.allowed {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(reset_secs));
    }
}

/// Periodically drop expired windows until the process exits
pub fn spawn_purge_task(store: InMemoryRateLimitStore) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        // First tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            store.purge_expired();
        }
    })
}
