//! Server configuration from environment variables
//!
//! `.env` is loaded by `main` before this runs.

use std::time::Duration;

use anyhow::{Context, bail};
use platform::password::DEFAULT_COST;
use platform::rate_limit::RateLimitConfig;
use platform::token::{DEFAULT_TOKEN_TTL, parse_ttl};

const DEFAULT_PORT: u16 = 4002;
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5000,https://localhost:5000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TRUST_PROXY_HOPS: usize = 1;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `None` runs on the in-memory store (debug builds only)
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    /// Reported by `/health`
    pub app_env: String,
    /// `None` means a random per-process secret (debug builds only)
    pub jwt_secret: Option<String>,
    pub jwt_ttl: Duration,
    pub bcrypt_cost: u32,
    pub frontend_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    /// Reverse proxies whose `X-Forwarded-For` entries are believed; 0 when
    /// clients connect directly
    pub trust_proxy_hops: usize,
}

impl ServerConfig {
    /// Read from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.require_production_settings(!cfg!(debug_assertions))?;
        Ok(config)
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("BACKEND_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("BACKEND_PORT is not a valid port: {v}"))?,
            None => DEFAULT_PORT,
        };

        let jwt_ttl = match get("JWT_EXPIRES_IN") {
            Some(v) => parse_ttl(&v).context("JWT_EXPIRES_IN is invalid")?,
            None => DEFAULT_TOKEN_TTL,
        };

        let bcrypt_cost = parse_or(get("BCRYPT_ROUNDS"), "BCRYPT_ROUNDS", DEFAULT_COST)?;
        let db_max_connections = parse_or(
            get("DB_MAX_CONNECTIONS"),
            "DB_MAX_CONNECTIONS",
            DEFAULT_DB_MAX_CONNECTIONS,
        )?;

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: parse_or(get("RATE_LIMIT_MAX"), "RATE_LIMIT_MAX", defaults.max_requests)?,
            window: Duration::from_secs(parse_or(
                get("RATE_LIMIT_WINDOW_SECS"),
                "RATE_LIMIT_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
        };
        if rate_limit.window.is_zero() {
            bail!("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }

        let trust_proxy_hops = parse_or(
            get("TRUST_PROXY_HOPS"),
            "TRUST_PROXY_HOPS",
            DEFAULT_TRUST_PROXY_HOPS,
        )?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let app_env = get("APP_ENV").unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                "development".to_string()
            } else {
                "production".to_string()
            }
        });

        Ok(Self {
            database_url: get("DATABASE_URL"),
            db_max_connections,
            port,
            app_env,
            jwt_secret: get("JWT_SECRET"),
            jwt_ttl,
            bcrypt_cost,
            frontend_origins,
            rate_limit,
            trust_proxy_hops,
        })
    }

    /// Release builds refuse to start without a database or a fixed secret
    pub fn require_production_settings(&self, release: bool) -> anyhow::Result<()> {
        if !release {
            return Ok(());
        }
        if self.database_url.is_none() {
            bail!("DATABASE_URL must be set in production");
        }
        if self.jwt_secret.is_none() {
            bail!("JWT_SECRET must be set in production");
        }
        Ok(())
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} is not a valid number: {v}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 4002);
        assert_eq!(config.jwt_ttl, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.trust_proxy_hops, 1);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(900));
        assert_eq!(
            config.frontend_origins,
            vec!["http://localhost:5000", "https://localhost:5000"]
        );
        assert!(config.database_url.is_none());
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BACKEND_PORT", "8080"),
            ("JWT_EXPIRES_IN", "12h"),
            ("BCRYPT_ROUNDS", "10"),
            ("FRONTEND_ORIGINS", "https://shop.example.com, http://localhost:3000 ,"),
            ("RATE_LIMIT_MAX", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "60"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("JWT_SECRET", "s3cret"),
            ("APP_ENV", "staging"),
            ("TRUST_PROXY_HOPS", "0"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(
            config.frontend_origins,
            vec!["https://shop.example.com", "http://localhost:3000"]
        );
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.app_env, "staging");
        assert_eq!(config.trust_proxy_hops, 0);
        assert!(config.require_production_settings(true).is_ok());
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = config_from(&[("BACKEND_PORT", ""), ("JWT_SECRET", "  ")]).unwrap();
        assert_eq!(config.port, 4002);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("BACKEND_PORT", "http")]).is_err());
        assert!(config_from(&[("JWT_EXPIRES_IN", "forever")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_WINDOW_SECS", "0")]).is_err());
        assert!(config_from(&[("TRUST_PROXY_HOPS", "-1")]).is_err());
    }

    #[test]
    fn test_production_requires_secrets() {
        let config = config_from(&[]).unwrap();
        assert!(config.require_production_settings(false).is_ok());
        assert!(config.require_production_settings(true).is_err());

        let config = config_from(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
        let err = config.require_production_settings(true).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}
