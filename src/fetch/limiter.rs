//! Rate limiting keyed per external dependency
//!
//! Every external dependency (the rendering proxy, or a host fetched
//! directly) gets its own quota. All adapters share one `RateLimiter`, so
//! the request budget does not depend on how many sources a session runs.

use crate::config::RateLimitConfig;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::Quota;
use std::num::NonZeroU32;

type KeyedLimiter = governor::RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limiter holding one quota per dependency key
pub struct RateLimiter {
    inner: KeyedLimiter,
}

impl RateLimiter {
    /// Creates a limiter allowing `burst` requests at once per key,
    /// replenished at `requests_per_minute`
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(rate).allow_burst(burst);

        Self {
            inner: governor::RateLimiter::keyed(quota),
        }
    }

    /// Creates a limiter from configuration
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_minute, config.burst)
    }

    /// Waits until a request to `key` is allowed
    pub async fn acquire(&self, key: &str) {
        let key = key.to_string();
        if self.inner.check_key(&key).is_ok() {
            return;
        }

        tracing::trace!("Rate limit reached for {}, waiting", key);
        self.inner.until_key_ready(&key).await;
    }

    /// Takes a permit for `key` without waiting
    pub fn try_acquire(&self, key: &str) -> bool {
        self.inner.check_key(&key.to_string()).is_ok()
    }
}
