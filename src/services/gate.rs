use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Global admission throttle: at most one accepted request per `min_interval`.
///
/// A single-cell GCRA limiter, so a rejected request leaves the window where
/// it was.
pub struct RequestGate {
    limiter: Option<DirectRateLimiter>,
    min_interval: Duration,
}

impl RequestGate {
    /// A zero interval yields a gate that admits everything.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        let limiter = Quota::with_period(min_interval)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));

        Self {
            limiter,
            min_interval,
        }
    }

    /// A gate that admits everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            limiter: None,
            min_interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Admits the request, or returns how long until the next one would be.
    pub fn admit(&self) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        limiter.check().map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            debug!(
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "Request rejected by gate"
            );
            wait
        })
    }
}
