//! Jittered exponential backoff for conflicting vote writes

use std::future::Future;
use std::time::Duration;

use blog_common::VoteConfig;
use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

/// Backoff schedule for retrying an operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first one (at least 1)
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of the delay randomly added or removed
    pub jitter_pct: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64, jitter_pct: f64) -> Self {
        let base_delay_ms = base_delay_ms.max(1);
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms: max_delay_ms.max(base_delay_ms),
            jitter_pct: jitter_pct.clamp(0.0, 1.0),
        }
    }

    /// Delay before retry number `retry` (0-based)
    pub fn next_delay(&self, retry: u32) -> Duration {
        let delay = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_delay_ms);

        let spread = (delay as f64 * self.jitter_pct) as i64;
        let jittered = if spread > 0 {
            delay.saturating_add_signed(rand::thread_rng().gen_range(-spread..=spread))
        } else {
            delay
        };
        Duration::from_millis(jittered)
    }

    /// Run `op` until it succeeds, fails with an error `should_retry`
    /// rejects, or attempts run out. The last error is returned as is.
    pub async fn retry_when<F, Fut, T, E, P>(&self, should_retry: P, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if should_retry(&err) && attempt + 1 < self.max_attempts => {
                    let delay = self.next_delay(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after conflict");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl From<&VoteConfig> for RetryPolicy {
    fn from(config: &VoteConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.retry_base_delay_ms,
            config.retry_max_delay_ms,
            0.25,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&VoteConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_new_clamps_inputs() {
        let policy = RetryPolicy::new(0, 0, 0, 3.0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay_ms, 1);
        assert_eq!(policy.max_delay_ms, 1);
        assert!((policy.jitter_pct - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::new(5, 10, 50, 0.0);
        assert_eq!(policy.next_delay(0), Duration::from_millis(10));
        assert_eq!(policy.next_delay(1), Duration::from_millis(20));
        assert_eq!(policy.next_delay(2), Duration::from_millis(40));
        assert_eq!(policy.next_delay(3), Duration::from_millis(50));
        assert_eq!(policy.next_delay(40), Duration::from_millis(50));
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let policy = RetryPolicy::new(3, 100, 100, 0.2);
        for _ in 0..200 {
            let ms = policy.next_delay(0).as_millis();
            assert!((80..=120).contains(&ms), "{ms}");
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let policy = RetryPolicy::new(3, 1, 1, 0.0);
        let calls = AtomicU32::new(0);

        let result: Result<u32, &str> = policy
            .retry_when(
                |_| true,
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { if attempt < 2 { Err("busy") } else { Ok(attempt) } }
                },
            )
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, 1, 1, 0.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = policy
            .retry_when(
                |_| true,
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("busy") }
                },
            )
            .await;

        assert_eq!(result, Err("busy"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let policy = RetryPolicy::new(5, 1, 1, 0.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = policy
            .retry_when(
                |e| *e == "busy",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("gone") }
                },
            )
            .await;

        assert_eq!(result, Err("gone"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
