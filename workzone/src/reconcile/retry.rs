//! Bounded retry for writes that may fail until the server catches up
//!
//! Right after a repository is created, or the plugin installed, Workzone
//! answers POSTs with errors for a while. Every failure is retried at a fixed
//! interval until the deadline. An attempt still in flight when the deadline
//! passes is abandoned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tfplug::Context;
use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Total time allowed for all attempts
    pub timeout: Duration,
    /// Pause between attempts
    pub interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_millis(500),
        }
    }
}

/// The deadline passed; carries the error of the last completed attempt
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// `None` when the deadline passed before any attempt finished
    pub last_error: Option<E>,
    /// Attempts started, including one cut off by the deadline
    pub attempts: u32,
}

/// Resolves once `done` reads `true`
async fn cancelled(done: &mut watch::Receiver<bool>) {
    while !*done.borrow_and_update() {
        if done.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Run `operation` until it succeeds or the deadline derived from `ctx`
/// and `config.timeout` passes
pub async fn retry_until_deadline<T, E, F, Fut>(
    ctx: &Context,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let ctx = ctx.with_timeout(config.timeout);
    let mut done = ctx.done();
    let mut attempts = 0;
    let mut last_error = None;

    loop {
        attempts += 1;

        let outcome = tokio::select! {
            biased;
            outcome = operation() => outcome,
            _ = cancelled(&mut done) => {
                tracing::debug!("Attempt {} abandoned at the deadline", attempts);
                return Err(RetryExhausted {
                    last_error,
                    attempts,
                });
            }
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !ctx.is_cancelled() {
            tracing::debug!(
                "Attempt {} failed: {}, retrying in {:?}",
                attempts,
                error,
                config.interval
            );

            tokio::select! {
                _ = tokio::time::sleep(config.interval) => {}
                _ = cancelled(&mut done) => {}
            }
        }
        last_error = Some(error);

        if ctx.is_cancelled() {
            return Err(RetryExhausted {
                last_error,
                attempts,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast() -> RetryConfig {
        RetryConfig {
            timeout: Duration::from_millis(300),
            interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn default_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.timeout.as_secs(), 60);
        assert_eq!(config.interval.as_millis(), 500);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = retry_until_deadline(&Context::new(), &fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err("not yet")
            } else {
                Ok("saved")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "saved");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_at_the_deadline_with_last_error() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), _> = retry_until_deadline(&Context::new(), &fast(), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(format!("failure {}", n))
        })
        .await;

        let exhausted = result.unwrap_err();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_secs(5));
        assert!(exhausted.attempts > 1);
        assert_eq!(exhausted.attempts, calls.load(Ordering::SeqCst));
        assert_eq!(
            exhausted.last_error,
            Some(format!("failure {}", exhausted.attempts - 1))
        );
    }

    #[tokio::test]
    async fn hanging_attempt_is_abandoned_at_the_deadline() {
        let config = RetryConfig {
            timeout: Duration::from_millis(100),
            interval: Duration::from_millis(10),
        };
        let start = Instant::now();

        let result: Result<(), _> = retry_until_deadline(&Context::new(), &config, || async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Err("too late")
        })
        .await;

        let exhausted = result.unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(exhausted.attempts, 1);
        assert!(exhausted.last_error.is_none());
    }

    #[tokio::test]
    async fn abandoned_attempt_keeps_earlier_error() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            timeout: Duration::from_millis(150),
            interval: Duration::from_millis(10),
        };
        let start = Instant::now();

        let result: Result<(), _> = retry_until_deadline(&Context::new(), &config, || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("not ready")
            } else {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Err("too late")
            }
        })
        .await;

        let exhausted = result.unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(600));
        assert_eq!(exhausted.attempts, 2);
        assert_eq!(exhausted.last_error, Some("not ready"));
    }

    #[tokio::test]
    async fn parent_cancel_interrupts_running_attempt() {
        let ctx = Context::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let result: Result<(), _> =
            retry_until_deadline(&ctx, &RetryConfig::default(), || async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Err("too late")
            })
            .await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn stops_when_parent_context_is_cancelled() {
        let ctx = Context::new();
        ctx.cancel();

        let config = RetryConfig {
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(10),
        };
        let start = Instant::now();
        let result: Result<(), _> =
            retry_until_deadline(&ctx, &config, || async { Err("unavailable") }).await;

        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
