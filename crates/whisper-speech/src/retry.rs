//! # Call Retry
//!
//! Runs a remote call under a per-attempt timeout and retries transient
//! failures with exponential backoff.
//!
//! The executor:
//! 1. Invokes the call factory, bounded by `tokio::time::timeout`
//! 2. On a retryable error, waits `max(backoff, Retry-After)` and tries again
//! 3. Stops at the first success, a permanent error, or `max_retries`
//!
//! No wait exceeds `max_delay_ms`. A Retry-After longer than that ends the
//! run at once and the error keeps the hint for the caller.
//!
//! The factory is invoked afresh for every attempt, so each attempt sends a
//! complete new request.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};
use whisper_core::retry::{RetryConfig, calculate_backoff_delay_with_random};

use crate::errors::SpeechError;

/// A successful result and how many attempts it took.
#[derive(Clone, Debug, PartialEq)]
pub struct Attempted<T> {
    /// The call's result.
    pub value: T,
    /// Attempts made, counting the successful one.
    pub attempts: u32,
}

/// Retry parameters plus the per-attempt timeout.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Backoff and retry budget.
    pub retry: RetryConfig,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(retry: RetryConfig, attempt_timeout: Duration) -> Self {
        Self {
            retry,
            attempt_timeout,
        }
    }

    /// Delay before retry number `retry_index` (zero-based).
    fn delay_for(&self, retry_index: u32, err: &SpeechError) -> Duration {
        let backoff_ms = calculate_backoff_delay_with_random(
            retry_index,
            self.retry.base_delay_ms,
            self.retry.max_delay_ms,
            self.retry.jitter_factor,
            rand::random::<f64>(),
        );
        // Respect Retry-After when it asks for longer
        let delay_ms = err.retry_after_ms().map_or(backoff_ms, |ra| backoff_ms.max(ra));
        Duration::from_millis(delay_ms)
    }

    /// Run `call` until it succeeds or fails permanently.
    ///
    /// Returns the last error once the retry budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<Attempted<T>, SpeechError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SpeechError>>,
    {
        let timeout_ms = u64::try_from(self.attempt_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(self.attempt_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(SpeechError::Timeout { timeout_ms }),
            };

            let err = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempts = attempt, "succeeded after retry");
                    }
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            if !err.is_retryable() || attempt > self.retry.max_retries {
                warn!(
                    operation,
                    attempts = attempt,
                    category = err.category(),
                    error = %err,
                    "remote call failed"
                );
                return Err(err);
            }

            if let Some(retry_after_ms) = err.retry_after_ms().filter(|ms| *ms > self.retry.max_delay_ms) {
                warn!(
                    operation,
                    attempts = attempt,
                    retry_after_ms,
                    max_delay_ms = self.retry.max_delay_ms,
                    error = %err,
                    "server asked to wait longer than the retry cap"
                );
                return Err(err);
            }

            let delay = self.delay_for(attempt - 1, &err);
            warn!(
                operation,
                attempt,
                max_attempts = self.retry.max_attempts(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                category = err.category(),
                error = %err,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use assert_matches::assert_matches;
    use whisper_core::logging::capture_logs;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(
            RetryConfig {
                max_retries,
                base_delay_ms: 100,
                max_delay_ms: 1_000,
                jitter_factor: 0.0,
            },
            Duration::from_millis(500),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_takes_one_attempt() {
        let result = policy(3).run("test", || async { Ok::<_, SpeechError>(7) }).await.unwrap();
        assert_eq!(result, Attempted { value: 7, attempts: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn two_timeouts_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = policy(3)
            .run("test", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                    Ok::<_, SpeechError>("done")
                }
            })
            .await
            .unwrap();

        assert_eq!(result.value, "done");
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = policy(3)
            .run("test", move || {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(SpeechError::Auth {
                        message: "invalid key".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_matches!(err, SpeechError::Auth { .. });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn budget_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = policy(2)
            .run("test", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err::<(), _>(SpeechError::Api {
                        status: 503,
                        message: format!("overloaded #{n}"),
                        code: None,
                        retryable: true,
                    })
                }
            })
            .await
            .unwrap_err();

        assert_matches!(err, SpeechError::Api { ref message, .. } if message == "overloaded #2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_extends_the_wait() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = tokio::time::Instant::now();

        let _ = policy(1)
            .run("test", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        return Err(SpeechError::RateLimited {
                            retry_after_ms: Some(800),
                            message: "slow down".into(),
                        });
                    }
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_beyond_the_cap_fails_fast() {
        let (logs, _guard) = capture_logs();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = tokio::time::Instant::now();

        let err = policy(3)
            .run("test", move || {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(SpeechError::RateLimited {
                        retry_after_ms: Some(86_400_000),
                        message: "daily quota".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(err.retry_after_ms(), Some(86_400_000));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(logs.has_message("server asked to wait longer than the retry cap"));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_logged() {
        let (logs, _guard) = capture_logs();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let _ = policy(3)
            .run("transcribe", move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        return Err(SpeechError::Timeout { timeout_ms: 1 });
                    }
                    Ok(())
                }
            })
            .await
            .unwrap();

        assert!(logs.has_message("transient failure, retrying"));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let p = policy(5);
        let err = SpeechError::Timeout { timeout_ms: 1 };
        assert_eq!(p.delay_for(0, &err), Duration::from_millis(100));
        assert_eq!(p.delay_for(1, &err), Duration::from_millis(200));
        assert_eq!(p.delay_for(10, &err), Duration::from_millis(1_000));
    }
}
