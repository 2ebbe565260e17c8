// Backoff for transient request failures
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How stubbornly a failed request is re-sent.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each one after that.
    pub initial_delay: Duration,
    /// Ceiling for the doubled delays.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Runs `operation` until it succeeds or the retry budget runs out,
/// sleeping between attempts with the delay doubling up to `max_delay`.
/// The last error is handed back unchanged.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "request recovered");
                }
                return Ok(value);
            }
            Err(err) if attempt <= config.max_retries => {
                warn!(attempt, max = config.max_retries, %err, delay_ms = delay.as_millis() as u64, "request failed, backing off");
                sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
            Err(err) => {
                warn!(attempt, %err, "request failed, giving up");
                return Err(err);
            }
        }
    }
}

/// Statuses worth another attempt: server-side errors, rate limiting,
/// and request timeouts.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            reqwest::StatusCode::TOO_MANY_REQUESTS | reqwest::StatusCode::REQUEST_TIMEOUT
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn test_first_success_needs_no_retry() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryConfig::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>(42)
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_the_budget() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast_config(3), || async {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err("flaky"),
                _ => Ok(42),
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_spent_returns_the_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = with_retry(&fast_config(2), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("still broken")
        })
        .await;

        assert_eq!(result, Err("still broken"));
        // Initial attempt plus two retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(reqwest::StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(reqwest::StatusCode::UNAUTHORIZED));
    }
}
