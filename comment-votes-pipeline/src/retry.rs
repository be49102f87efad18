//! Standard write policy of the stores: bounded, jittered exponential backoff
//! on transient failures, optionally with a timeout per attempt.
use std::future::Future;
use std::time::Duration;
use comment_votes_repository::{AttemptTimeout, TransientError};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

/// Timeout and retry settings shared by the vote store and counter writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes a single attempt.
    pub fn no_retries(attempt_timeout: Duration) -> Self {
        Self { max_retries: 0, attempt_timeout, ..Self::default() }
    }

    fn backoff(&self) -> impl Iterator<Item = Duration> {
        let base_millis = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX).max(1);
        ExponentialBackoff::from_millis(base_millis)
            .factor(2)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_retries)
    }

    /// Runs `operation` until it succeeds, fails with a non-transient error,
    /// or the retry budget is spent.
    ///
    /// Attempts are never cut short; the operation bounds its own work.
    pub async fn retry<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        E: TransientError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        RetryIf::spawn(self.backoff(), operation, |error: &E| error.is_transient()).await
    }

    /// Like [`RetryPolicy::retry`], with every attempt bounded by `attempt_timeout`.
    ///
    /// An attempt that exceeds it is dropped and reported as `E::timed_out`,
    /// which is never retried.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: AttemptTimeout,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempt_timeout = self.attempt_timeout;
        self.retry(|| {
            let attempt = operation();
            async move {
                match tokio::time::timeout(attempt_timeout, attempt).await {
                    Ok(result) => result,
                    Err(_) => Err(E::timed_out(attempt_timeout)),
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use comment_votes_repository::{CounterStoreError, VoteStoreError};

    fn policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            attempt_timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried_until_success() {
        let attempts = AtomicUsize::new(0);

        let result = policy(3)
            .run(|| async {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(CounterStoreError::Busy("serialization failure".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = policy(2)
            .run(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CounterStoreError::Busy("deadlock detected".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CounterStoreError::Busy(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_errors_fail_fast() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = policy(3)
            .run(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(CounterStoreError::Unavailable("connection refused".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CounterStoreError::Unavailable(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_attempt_is_not_retried() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), CounterStoreError> = policy(3)
            .run(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(CounterStoreError::TimedOut(after)) if after == Duration::from_millis(50)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_lets_slow_attempts_finish() {
        let attempts = AtomicUsize::new(0);

        let result = policy(3)
            .retry(|| async {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                if attempt == 0 {
                    Err(VoteStoreError::TimedOut(Duration::from_millis(50)))
                } else {
                    Ok("committed")
                }
            })
            .await;

        // A rolled back vote write is retried, and no attempt is cut short.
        assert_eq!(result.unwrap(), "committed");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
