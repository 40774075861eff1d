//! HTTP application assembly
//!
//! Layer order, outermost first: trace → CORS → security headers →
//! trusted proxy count → rate limit → body limit → routes.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Extension, Router, middleware};
use platform::client::TrustedProxies;
use platform::rate_limit::InMemoryRateLimitStore;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::health::{health_router, not_found};
use crate::rate_limit::{RateLimitState, rate_limit};

/// Maximum accepted request body (10 MiB)
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Wrap the auth routes with the server-wide routes and middleware
pub fn build_app(
    auth_routes: Router,
    config: &ServerConfig,
    limiter: InMemoryRateLimitStore,
) -> Router {
    let rate_state = RateLimitState::new(limiter, config.rate_limit.clone());

    Router::new()
        .merge(health_router(&config.app_env))
        .nest("/api/auth", auth_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(
            rate_state,
            rate_limit::<InMemoryRateLimitStore>,
        ))
        .layer(Extension(TrustedProxies(config.trust_proxy_hops)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.frontend_origins))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                )),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ]))
        .allow_credentials(true)
}
