//! Error Kind
//!
//! The closed set of failure classes the API reports.

use serde::Serialize;

/// Error classification; each kind owns exactly one HTTP status
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Conflict.status_code(), 409);
/// assert_eq!(ErrorKind::Conflict.as_str(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Missing or invalid input
    BadRequest,
    /// No credentials, or credentials that do not identify an active user
    Unauthorized,
    /// Credentials present but not acceptable (bad or expired token)
    Forbidden,
    NotFound,
    /// Duplicate email
    Conflict,
    PayloadTooLarge,
    TooManyRequests,
    InternalServerError,
    /// Database unreachable or exhausted
    ServiceUnavailable,
}

impl ErrorKind {
    const fn parts(&self) -> (u16, &'static str) {
        match self {
            ErrorKind::BadRequest => (400, "Bad Request"),
            ErrorKind::Unauthorized => (401, "Unauthorized"),
            ErrorKind::Forbidden => (403, "Forbidden"),
            ErrorKind::NotFound => (404, "Not Found"),
            ErrorKind::Conflict => (409, "Conflict"),
            ErrorKind::PayloadTooLarge => (413, "Payload Too Large"),
            ErrorKind::TooManyRequests => (429, "Too Many Requests"),
            ErrorKind::InternalServerError => (500, "Internal Server Error"),
            ErrorKind::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    /// HTTP status code
    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.parts().0
    }

    /// Reason phrase, used as the `title` of error bodies
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.parts().1
    }

    /// 5xx: logged at error level, message hidden from clients
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
