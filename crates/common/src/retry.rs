use crate::config::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Calculate the delay for the next retry attempt with exponential backoff.
pub fn next_retry_delay(attempt: usize, base_ms: u64, max_ms: u64) -> Duration {
    let multiplier = 2_u64.saturating_pow(attempt as u32);
    let delay = base_ms.saturating_mul(multiplier);
    // Add jitter up to 1000ms
    let jitter = rand::random::<u64>() % 1000;
    let total = delay.saturating_add(jitter);
    Duration::from_millis(total.min(max_ms))
}

/// Execute an async operation with retries.
pub async fn retry_async<T, E, F, Fut>(
    operation_name: &str,
    settings: RetrySettings,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_async_when(operation_name, settings, operation, |_| true).await
}

/// Like [`retry_async`], but errors for which `retryable` is false are returned at once.
pub async fn retry_async_when<T, E, F, Fut, P>(
    operation_name: &str,
    settings: RetrySettings,
    operation: F,
    retryable: P,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = settings.max_attempts.max(1) as usize;
    let mut attempt = 0;
    loop {
        let e = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };
        attempt += 1;

        if !retryable(&e) {
            warn!(operation = operation_name, attempt, error = %e, "Operation failed with a permanent error");
            return Err(e);
        }
        if attempt >= max_attempts {
            error!(
                operation = operation_name,
                attempts = attempt,
                error = %e,
                "Operation failed after all attempts"
            );
            return Err(e);
        }

        let delay = next_retry_delay(attempt, settings.base_delay_ms, settings.max_delay_ms);
        warn!(
            operation = operation_name,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %e,
            "Operation failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
