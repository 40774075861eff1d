//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError, conversions::classify_sqlx_error, kind::ErrorKind,
};
use platform::token::TokenError;
use thiserror::Error;

use crate::domain::value_object::{
    email::EmailError, nickname::NicknameError, profile_field::ProfileFieldError,
};

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required request fields were absent or empty
    #[error("{0}")]
    MissingFields(&'static str),

    /// A field failed validation
    #[error("{0}")]
    Validation(String),

    /// Profile update without any updatable field
    #[error("No fields to update")]
    NoProfileFields,

    /// Email already registered
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown email, inactive account or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account has no password (created through social login)
    #[error("This account was created with social login")]
    SocialAccount,

    /// No bearer token on a protected route
    #[error("Access token is required")]
    MissingToken,

    /// Token signature, format or claims rejected
    #[error("Invalid token")]
    InvalidToken,

    /// Token `exp` is in the past
    #[error("Token has expired")]
    TokenExpired,

    /// Token was valid but its user is gone or deactivated
    #[error("User not found or inactive")]
    UserNotFound,

    /// Error already classified elsewhere (password policy, hashing)
    #[error("{0}")]
    App(AppError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingFields(_)
            | AuthError::Validation(_)
            | AuthError::NoProfileFields => ErrorKind::BadRequest,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::SocialAccount
            | AuthError::MissingToken
            | AuthError::UserNotFound => ErrorKind::Unauthorized,
            AuthError::InvalidToken | AuthError::TokenExpired => ErrorKind::Forbidden,
            AuthError::App(err) => err.kind(),
            AuthError::Database(e) => classify_sqlx_error(e).0,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn action(&self) -> Option<&'static str> {
        match self {
            AuthError::EmailTaken => Some("Sign in instead, or use another email address"),
            AuthError::SocialAccount => Some("Please sign in with your social account"),
            AuthError::MissingToken | AuthError::TokenExpired => Some("Please sign in again"),
            _ => None,
        }
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::App(err) => err,
            AuthError::Database(source) => AppError::from(source),
            other => {
                let err = AppError::new(other.kind(), other.to_string());
                match other.action() {
                    Some(action) => err.with_action(action),
                    None => err,
                }
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::App(err) if err.is_server_error() => {
                tracing::error!(error = ?err, "Auth internal error");
            }
            AuthError::InvalidCredentials | AuthError::SocialAccount => {
                tracing::warn!(error = %self, "Rejected login attempt");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::App(err)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid(_) => AuthError::InvalidToken,
            TokenError::Encoding(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<EmailError> for AuthError {
    fn from(err: EmailError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<NicknameError> for AuthError {
    fn from(err: NicknameError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<ProfileFieldError> for AuthError {
    fn from(err: ProfileFieldError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
