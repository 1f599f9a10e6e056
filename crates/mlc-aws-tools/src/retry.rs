//! Retry with exponential backoff for throttled AWS calls.
//!
//! Only `Throttled` failures are retried; permission and not-found
//! failures surface immediately. Delays grow strictly: base, 2×base,
//! 4×base, …

use std::future::Future;
use std::time::Duration;

use crate::error::{AwsResult, AwsToolError};

/// Bounds for transient-failure retries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(200),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Run `op`, retrying throttled failures up to the policy bound.
pub async fn call<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> AwsResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AwsResult<T>>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < max => {
                let delay = policy.base_delay * 2u32.saturating_pow(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = max,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "throttled, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// The degraded-result note attached when retries are exhausted.
pub fn degraded_note(tool: &str, err: &AwsToolError) -> String {
    format!("{tool}: degraded result after exhausting retries ({err})")
}
