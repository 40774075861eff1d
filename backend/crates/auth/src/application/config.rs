//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::clamp_cost;
use platform::token::TokenService;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Bearer token signer/verifier
    pub tokens: TokenService,
    /// bcrypt work factor for new hashes
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            tokens,
            bcrypt_cost: clamp_cost(bcrypt_cost),
        }
    }

    /// Create config from a shared secret
    pub fn with_secret(secret: &[u8], token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self::new(TokenService::new(secret, token_ttl), bcrypt_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::token::DEFAULT_TOKEN_TTL;

    #[test]
    fn test_cost_is_clamped() {
        let config = AuthConfig::with_secret(b"s", DEFAULT_TOKEN_TTL, 2);
        assert_eq!(config.bcrypt_cost, 4);

        let config = AuthConfig::with_secret(b"s", DEFAULT_TOKEN_TTL, 99);
        assert_eq!(config.bcrypt_cost, 31);
    }
}
