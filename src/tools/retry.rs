//! Retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How often and how patiently to retry one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

/// Outcome of [`RetryPolicy::run`].
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Default::default()
        }
    }

    /// A single attempt with no retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor.max(1.0);
        self
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    /// Saturates at [`Duration::MAX`].
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Run `op` until it succeeds or attempts run out. The closure receives the
    /// 1-based attempt number. The last error is returned on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Retried<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => {
                    return Retried {
                        result: Ok(value),
                        attempts: attempt,
                    }
                }
                Err(err) if attempt < max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}. Retrying in {:?}",
                        label, attempt, max_attempts, err, delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    return Retried {
                        result: Err(err),
                        attempts: attempt,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delays_grow_exponentially() {
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
        assert_eq!(policy.delay_after(3), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(3, Duration::MAX);
        assert_eq!(policy.delay_after(3), Duration::MAX);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let retried = policy
            .run("test", |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(format!("failure {}", n))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(retried.result, Ok(3));
        assert_eq!(retried.attempts, 3);
    }

    #[tokio::test]
    async fn test_last_error_surfaces() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let retried: Retried<(), String> = policy
            .run("test", |attempt| async move { Err(format!("failure {}", attempt)) })
            .await;
        assert_eq!(retried.result, Err("failure 2".to_string()));
        assert_eq!(retried.attempts, 2);
    }

    #[tokio::test]
    async fn test_single_attempt() {
        let calls = AtomicU32::new(0);
        let retried: Retried<(), &str> = RetryPolicy::once()
            .run("test", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope") }
            })
            .await;
        assert!(retried.result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
