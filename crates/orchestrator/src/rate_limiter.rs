//! Probe rate limiting shared by all workers of a run

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;

pub struct RateLimiter {
    inner: DefaultDirectRateLimiter,
}

impl RateLimiter {
    /// Allow `per_second` probes per second, bursting up to the same amount.
    pub fn new(per_second: NonZeroU32) -> Self {
        Self {
            inner: DefaultDirectRateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    /// Wait until the next probe may be sent.
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn burst_then_throttle() {
        let limiter = RateLimiter::new(NonZeroU32::new(10).unwrap());
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
