//! Rate Limiting Infrastructure
//!
//! Fixed-window request counting keyed by client. The in-memory store keeps
//! one counter per key; counters whose window has passed are restarted on the
//! next hit and dropped by [`InMemoryRateLimitStore::purge_expired`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets (rounded up, never negative)
    pub fn reset_after_secs(&self, now_ms: i64) -> u64 {
        let delta = (self.reset_at_ms - now_ms).max(0);
        u64::try_from((delta + 999) / 1000).unwrap_or(0)
    }
}

/// Error surfaced by a rate limit backend
pub type RateLimitError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment the counter for `key`
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at_ms: i64,
}

/// Process-local fixed-window store
///
/// Counters are not shared between server instances.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimitStore {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters stay usable even if a holder panicked
    fn windows(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Count a hit for `key` at `now_ms`
    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let mut windows = self.windows();

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at_ms: now_ms + config.window_ms(),
        });

        if now_ms >= window.reset_at_ms {
            window.count = 0;
            window.reset_at_ms = now_ms + config.window_ms();
        }

        window.count = window.count.saturating_add(1);
        let allowed = window.count <= config.max_requests;

        RateLimitResult {
            allowed,
            limit: config.max_requests,
            remaining: config.max_requests.saturating_sub(window.count),
            reset_at_ms: window.reset_at_ms,
        }
    }

    /// Drop windows that ended before `now_ms`, returning how many were removed
    pub fn purge_expired_at(&self, now_ms: i64) -> usize {
        let mut windows = self.windows();
        let before = windows.len();
        windows.retain(|_, window| window.reset_at_ms > now_ms);
        before - windows.len()
    }

    /// Drop windows that have already ended
    pub fn purge_expired(&self) -> usize {
        let removed = self.purge_expired_at(Utc::now().timestamp_millis());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired rate limit windows");
        }
        removed
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.windows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, config, Utc::now().timestamp_millis()))
    }
}
