//! Framework error conversions
//!
//! sqlx and axum errors are classified here so every crate maps them to the
//! same status code.

#[cfg(feature = "sqlx")]
use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx (feature-gated)
// ============================================================================

/// SQLSTATE for `unique_violation`
#[cfg(feature = "sqlx")]
const UNIQUE_VIOLATION: &str = "23505";

/// Kind and client message for a database failure
///
/// Connection trouble is reported as 503 so clients may retry; integrity
/// errors the caller did not anticipate become 409/400.
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
pub fn classify_sqlx_error(err: &sqlx::Error) -> (ErrorKind, &'static str) {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            (ErrorKind::ServiceUnavailable, "Database connection pool exhausted")
        }
        sqlx::Error::Io(_) => (ErrorKind::ServiceUnavailable, "Database connection error"),
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => (ErrorKind::Conflict, "Duplicate key value"),
            Some("23502" | "23514" | "22001") => {
                (ErrorKind::BadRequest, "Value rejected by the database")
            }
            Some(code) if code.starts_with("53") || code.starts_with("57") => {
                (ErrorKind::ServiceUnavailable, "Database unavailable")
            }
            _ => (ErrorKind::InternalServerError, "Database error"),
        },
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let (kind, message) = classify_sqlx_error(&err);
        AppError::new(kind, message).with_source(err)
    }
}

/// Whether a sqlx error is a PostgreSQL unique-constraint violation
#[cfg(feature = "sqlx")]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

// ============================================================================
// Axum (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl From<axum::extract::rejection::JsonRejection> for super::app_error::AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        use super::app_error::AppError;
        use super::kind::ErrorKind;
        use axum::extract::rejection::JsonRejection;

        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::bad_request("Expected a JSON request body")
                    .with_action("Send the request with `Content-Type: application/json`")
            }
            JsonRejection::JsonSyntaxError(e) => {
                AppError::bad_request(format!("Malformed JSON: {}", e.body_text()))
            }
            JsonRejection::JsonDataError(e) => {
                AppError::bad_request(format!("Invalid request body: {}", e.body_text()))
            }
            JsonRejection::BytesRejection(e) => {
                if e.status() == http::StatusCode::PAYLOAD_TOO_LARGE {
                    AppError::new(ErrorKind::PayloadTooLarge, "Request body is too large")
                } else {
                    AppError::bad_request("Failed to read request body")
                }
            }
            other => AppError::bad_request(other.body_text()),
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.body())).into_response()
    }
}

#[cfg(all(test, feature = "sqlx"))]
mod sqlx_tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        let (kind, _) = classify_sqlx_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(kind, ErrorKind::ServiceUnavailable);

        let err = AppError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.status_code(), 503);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}

#[cfg(all(test, feature = "axum"))]
mod axum_tests {
    use super::super::app_error::AppError;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use axum::response::IntoResponse;
    use axum::Json;

    async fn reject(request: Request<Body>) -> AppError {
        match Json::<serde_json::Value>::from_request(request, &()).await {
            Ok(_) => panic!("expected a rejection"),
            Err(rejection) => AppError::from(rejection),
        }
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let err = reject(Request::new(Body::from("{}"))).await;
        assert_eq!(err.status_code(), 400);
        assert!(err.action().is_some());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from("{\"email\":"))
            .unwrap();
        let err = reject(request).await;
        assert_eq!(err.status_code(), 400);

        let response = err.into_response();
        assert_eq!(response.status(), 400);
    }
}
