use std::time::Duration;

/// Backoff schedule and retry budget for the remote path.
///
/// A strategy trait so tests can inject a zero-delay policy and exercise the
/// full retry loop without waiting out real backoff.
pub trait RetryPolicy: Send + Sync {
    /// Total remote attempts before falling back to local recognition.
    fn max_attempts(&self) -> u32;

    /// Delay before the attempt following `attempt` (1-based).
    fn delay(&self, attempt: u32) -> Duration;
}

/// `2^attempt` seconds: 2s, 4s, 8s, ... capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub max_attempts: u32,
    pub base: Duration,
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(self.base.saturating_mul(factor), self.max_delay)
    }
}
