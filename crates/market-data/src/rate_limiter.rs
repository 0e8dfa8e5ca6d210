//! Token bucket rate limiter for a single provider.
//!
//! Providers own one limiter each and call [`RateLimiter::acquire`] before
//! every request.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Token bucket state.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(requests_per_minute: u32, capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: requests_per_minute.max(1) as f64 / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Rate limit settings for a provider.
#[derive(Clone, Copy, Debug)]
pub struct RateLimit {
    /// Maximum requests per minute.
    pub requests_per_minute: u32,
    /// Maximum burst.
    pub burst_capacity: f64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_capacity: 5.0,
        }
    }
}

/// Thread-safe token bucket limiter.
pub struct RateLimiter {
    label: &'static str,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    pub fn new(label: &'static str, limit: RateLimit) -> Self {
        Self {
            label,
            bucket: Mutex::new(TokenBucket::new(
                limit.requests_per_minute,
                limit.burst_capacity,
            )),
        }
    }

    /// Lock the bucket, recovering from poison. A poisoned bucket at worst
    /// paces one request wrongly.
    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter '{}' mutex was poisoned, recovering", self.label);
            poisoned.into_inner()
        })
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait_time = {
                let mut bucket = self.lock_bucket();
                if bucket.try_acquire() {
                    return;
                }
                bucket.time_until_available()
            };

            if wait_time > Duration::ZERO {
                debug!("Rate limiter '{}': waiting {:?}", self.label, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
    }
}
