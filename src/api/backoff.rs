use std::time::Duration;

/// Strategy for how long to wait after a failed attempt.
///
/// `attempt` is zero-based: the wait after the first failed attempt is
/// `delay(0)`. Production uses [`ExponentialBackoff`]; tests substitute
/// [`NoBackoff`] to stay off the wall clock.
pub trait BackoffPolicy {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Doubling backoff: `initial`, then 2x, 4x, and so on.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub initial: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration) -> Self {
        Self { initial }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        self.initial.saturating_mul(1u32 << attempt.min(31))
    }
}

/// Zero-delay policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl BackoffPolicy for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}
