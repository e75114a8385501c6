//! Send-with-timeout: bound a transport call and retry it a few times.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::Jitter;
use crate::error::HeraldError;

/// How a single send is bounded and retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendPolicy {
    pub timeout: Duration,
    /// Extra attempts after the first one fails.
    pub retries: u32,
    pub backoff: Jitter,
}

impl SendPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            retries: 0,
            backoff: Jitter::retry_backoff_default(),
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Jitter) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Race `send()` against `policy.timeout`, retrying on any failure.
///
/// A timed-out attempt's future is dropped, which cancels it at its next
/// suspension point. Work the transport already handed to another task
/// (a spawned request, a background connection) is not stopped.
///
/// Unlike per-item handler errors inside a batch, the last error here
/// always propagates to the caller.
pub async fn send_with_timeout<R, F, Fut>(mut send: F, policy: &SendPolicy) -> Result<R, HeraldError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, HeraldError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match tokio::time::timeout(policy.timeout, send()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_elapsed) => HeraldError::Timeout(policy.timeout),
        };

        if attempt > policy.retries {
            return Err(err);
        }

        let wait = policy.backoff.sample();
        warn!(
            attempt,
            retries_left = policy.retries - (attempt - 1),
            wait_ms = wait.as_millis() as u64,
            %err,
            "send failed, retrying"
        );
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy_ms(timeout_ms: u64) -> SendPolicy {
        SendPolicy::new(Duration::from_millis(timeout_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn never_resolving_send_times_out() {
        let started = Instant::now();

        let result: Result<(), _> =
            send_with_timeout(|| std::future::pending(), &policy_ms(100)).await;

        let elapsed = started.elapsed();
        assert!(matches!(result, Err(HeraldError::Timeout(d)) if d == Duration::from_millis(100)));
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_send_future_is_dropped() {
        struct DropFlag(Arc<AtomicBool>);
        impl Drop for DropFlag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dropped);
        let result: Result<(), _> = send_with_timeout(
            move || {
                let guard = DropFlag(Arc::clone(&flag));
                async move {
                    let _guard = guard;
                    std::future::pending::<Result<(), HeraldError>>().await
                }
            },
            &policy_ms(50),
        )
        .await;

        assert!(result.is_err());
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_backoff_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let counter = Arc::clone(&calls);
        let value = send_with_timeout(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(HeraldError::Handler(format!("transient #{n}")))
                    } else {
                        Ok(n)
                    }
                }
            },
            &policy_ms(1_000).with_retries(2),
        )
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two backoffs of 2–3s each
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_propagate_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), _> = send_with_timeout(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(HeraldError::Handler(format!("attempt {n}"))) }
            },
            &policy_ms(1_000).with_retries(1),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.unwrap_err().to_string(), "handler failed: attempt 2");
    }

    #[tokio::test(start_paused = true)]
    async fn retry_log_fields_hold_at_the_retry_ceiling() {
        // warn! fields are only evaluated with a subscriber installed
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let value = send_with_timeout(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(HeraldError::Handler(format!("transient #{n}")))
                    } else {
                        Ok(n)
                    }
                }
            },
            &policy_ms(1_000).with_retries(u32::MAX).with_backoff(Jitter::none()),
        )
        .await
        .unwrap();

        assert_eq!(value, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_retried_like_any_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let value = send_with_timeout(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        std::future::pending::<()>().await;
                    }
                    Ok("delivered")
                }
            },
            &policy_ms(200).with_retries(1).with_backoff(Jitter::none()),
        )
        .await
        .unwrap();

        assert_eq!(value, "delivered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
