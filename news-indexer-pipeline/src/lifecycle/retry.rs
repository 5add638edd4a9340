use std::time::Duration;

/// Fixed-interval retry policy for collection deletion and the connectivity
/// wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Never zero.
    pub max_attempts: u32,
    /// Pause between two attempts.
    pub interval: Duration,
    /// Pause between a delete request and the existence check that verifies it.
    pub verify_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval: Duration::from_secs(2),
            verify_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy used while waiting for the engine to come up.
    pub fn connectivity() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(2),
            verify_delay: Duration::ZERO,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_verify_delay(mut self, verify_delay: Duration) -> Self {
        self.verify_delay = verify_delay;
        self
    }

    /// Attempt count with the zero case folded to one.
    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether `attempt` (1-based) is the last one allowed.
    pub(crate) fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.attempts()
    }

    /// Sleep for the retry interval.
    pub(crate) async fn pause(&self) {
        tokio::time::sleep(self.interval).await;
    }
}
