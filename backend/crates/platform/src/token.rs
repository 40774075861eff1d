//! Bearer Tokens (HS256 JWT)
//!
//! Tokens carry `{ "userId": <id>, "iat": <secs>, "exp": <secs> }` and are
//! signed with a shared secret. Expiry is checked without leeway.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime (7 days)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Length of generated secrets in bytes
const GENERATED_SECRET_BYTES: usize = 32;

// ============================================================================
// Claims
// ============================================================================

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Token could not be signed: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TtlParseError {
    #[error("Token lifetime is empty")]
    Empty,

    #[error("Token lifetime '{0}' is not a number with an optional s/m/h/d suffix")]
    Malformed(String),

    #[error("Token lifetime must be greater than zero")]
    Zero,
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and verifies bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Service with a freshly generated random secret
    ///
    /// Tokens stop verifying once the process restarts.
    pub fn with_random_secret(ttl: Duration) -> Self {
        Self::new(generate_secret().as_bytes(), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user_id`, valid from now for the configured lifetime
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Sign a token with an explicit issue time (seconds since epoch)
    pub fn issue_at(&self, user_id: i64, iat: i64) -> Result<String, TokenError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            user_id,
            iat,
            exp: iat.saturating_add(ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Random hex secret from the OS generator
pub fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a lifetime like `7d`, `12h`, `30m`, `45s` or bare seconds (`3600`)
pub fn parse_ttl(raw: &str) -> Result<Duration, TtlParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TtlParseError::Empty);
    }

    let (digits, unit_secs) = match trimmed.char_indices().last() {
        Some((idx, 'd')) => (&trimmed[..idx], 24 * 60 * 60),
        Some((idx, 'h')) => (&trimmed[..idx], 60 * 60),
        Some((idx, 'm')) => (&trimmed[..idx], 60),
        Some((idx, 's')) => (&trimmed[..idx], 1),
        _ => (trimmed, 1),
    };

    let amount: u64 = digits
        .parse()
        .map_err(|_| TtlParseError::Malformed(trimmed.to_string()))?;
    if amount == 0 {
        return Err(TtlParseError::Zero);
    }

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| TtlParseError::Malformed(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", DEFAULT_TOKEN_TTL)
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let token = svc.issue(42).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL.as_secs() as i64);
    }

    #[test]
    fn test_claims_use_user_id_key() {
        let json = serde_json::to_value(Claims {
            user_id: 7,
            iat: 1,
            exp: 2,
        })
        .unwrap();
        assert_eq!(json["userId"], 7);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_expired_token() {
        let svc = TokenService::new(b"test-secret", Duration::from_secs(60));
        let issued_long_ago = Utc::now().timestamp() - 3600;
        let token = svc.issue_at(1, issued_long_ago).unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = service().issue(1).unwrap();
        let other = TokenService::new(b"another-secret", DEFAULT_TOKEN_TTL);

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(service().verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_random_secrets_differ() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), GENERATED_SECRET_BYTES * 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("7d"), Ok(Duration::from_secs(604_800)));
        assert_eq!(parse_ttl("12h"), Ok(Duration::from_secs(43_200)));
        assert_eq!(parse_ttl("30m"), Ok(Duration::from_secs(1_800)));
        assert_eq!(parse_ttl("45s"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_ttl(" 3600 "), Ok(Duration::from_secs(3_600)));
    }

    #[test]
    fn test_parse_ttl_errors() {
        assert_eq!(parse_ttl(""), Err(TtlParseError::Empty));
        assert_eq!(parse_ttl("0d"), Err(TtlParseError::Zero));
        assert!(matches!(parse_ttl("7w"), Err(TtlParseError::Malformed(_))));
        assert!(matches!(parse_ttl("d"), Err(TtlParseError::Malformed(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", service());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("test-secret"));
    }
}
