use crate::config::ReconnectConfig;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Bounded, fixed-delay reconnect policy with a cancellation token.
///
/// The counter tracks consecutive failed attempts since the last successful
/// open. Cancelling the token aborts any pending [`ReconnectPolicy::wait`] and
/// refuses every later attempt.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
    cancel: CancellationToken,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempts: 0,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: ReconnectConfig) -> Self {
        Self::new(config.max_attempts, config.delay)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Called on every successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Claim the next attempt number, or `None` once the bound is reached or the
    /// policy was cancelled.
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.is_cancelled() || self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    /// Sleep for the fixed delay. Returns `false` if cancelled first.
    pub async fn wait(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_stop_at_bound() {
        let mut policy = ReconnectPolicy::new(3, Duration::from_millis(10));

        assert_eq!(policy.next_attempt(), Some(1));
        assert_eq!(policy.next_attempt(), Some(2));
        assert_eq!(policy.next_attempt(), Some(3));
        assert_eq!(policy.next_attempt(), None);
        assert_eq!(policy.next_attempt(), None);
        assert_eq!(policy.attempts(), 3);
    }

    #[test]
    fn test_reset_after_successful_open() {
        let mut policy = ReconnectPolicy::new(2, Duration::from_millis(10));
        policy.next_attempt();
        policy.next_attempt();
        assert_eq!(policy.next_attempt(), None);

        policy.reset();
        assert_eq!(policy.next_attempt(), Some(1));
    }

    #[test]
    fn test_zero_max_never_retries() {
        let mut policy = ReconnectPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.next_attempt(), None);
    }

    #[test]
    fn test_cancel_refuses_attempts_across_clones() {
        let mut policy = ReconnectPolicy::new(3, Duration::from_millis(10));
        let token = policy.token();
        token.cancel();

        assert!(policy.is_cancelled());
        assert_eq!(policy.next_attempt(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_fixed_delay() {
        let policy = ReconnectPolicy::new(3, Duration::from_secs(3));
        let start = tokio::time::Instant::now();

        assert!(policy.wait().await);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_pending_wait() {
        let policy = ReconnectPolicy::new(3, Duration::from_secs(60));
        let token = policy.token();
        let start = tokio::time::Instant::now();

        let waiter = tokio::spawn(async move { policy.wait().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        assert!(!waiter.await.unwrap());
        assert!(start.elapsed() < Duration::from_secs(60));
    }
}
