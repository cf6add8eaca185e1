use std::num::NonZeroU32;
use governor::{DefaultKeyedRateLimiter, Quota};
use tracing::debug;

/// Per-client request limiter. Owned by `AppState`; idle keys are evicted
/// by the background worker.
pub struct RateLimiter {
    inner: DefaultKeyedRateLimiter<String>,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
        Self { inner: governor::RateLimiter::keyed(Quota::per_minute(limit)) }
    }

    pub fn check(&self, client: &str) -> bool {
        self.inner.check_key(&client.to_string()).is_ok()
    }

    /// Drops keys whose quota has fully replenished.
    pub fn evict_idle(&self) {
        let before = self.inner.len();
        self.inner.retain_recent();
        self.inner.shrink_to_fit();
        debug!(before, after = self.inner.len(), "Rate limiter evicted idle clients");
    }

    pub fn tracked_clients(&self) -> usize {
        self.inner.len()
    }
}
