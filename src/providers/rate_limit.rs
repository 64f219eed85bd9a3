use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-interval rate limiter shared by all provider calls. Every external
/// call acquires the limiter first; the limiter sleeps just long enough to
/// keep successive calls at least `min_interval` apart.
///
/// Suspension is explicit and testable: under `tokio::time::pause` the
/// sleeps resolve against the mock clock.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// A limiter that never delays. Useful for tests and offline providers.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Wait until the next call is allowed, then claim the slot.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_call.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last {
            let next_allowed = previous + self.min_interval;
            if next_allowed > now {
                let wait = next_allowed - now;
                tracing::debug!("Rate limiter delaying {}ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }

        // Claim the slot at the actual post-sleep time so concurrent callers
        // queue behind each other rather than bunching.
        *last = Some(Instant::now());
    }
}
