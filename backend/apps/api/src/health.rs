//! Health check and fallback routes

use axum::extract::State;
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use kernel::error::app_error::AppError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub environment: String,
}

/// GET /health
async fn health(State(environment): State<Arc<str>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Backend server is running",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: environment.to_string(),
    })
}

pub fn health_router(environment: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(Arc::<str>::from(environment))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::not_found("The requested API endpoint was not found")
}
