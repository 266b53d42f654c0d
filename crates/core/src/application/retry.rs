// Retry combinator for the enrichment callers (§4.6, §9)
//
// Generalizes the donor's job-worker RetryPolicy (base * backoff_factor^attempt
// with +-10% jitter, keyed off a deterministic per-job seed to de-synchronize
// many concurrently-retrying jobs) to the enrichment law `base * 2^attempt`
// with no jitter: enrichment batches are issued strictly sequentially (§5),
// so there is nothing concurrent to de-synchronize.

use crate::error::AppError;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Failed,
}

pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    is_retryable: fn(&AppError) -> bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, is_retryable: fn(&AppError) -> bool) -> Self {
        Self {
            max_attempts,
            base_delay,
            is_retryable,
        }
    }

    /// The default enricher policy: 5 attempts, base_delay = 1s, retryable
    /// iff `AppError::is_rate_limited()`.
    pub fn default_enricher() -> Self {
        Self::new(5, Duration::from_secs(1), AppError::is_rate_limited)
    }

    pub fn should_retry(&self, attempt: u32, error: &AppError) -> RetryDecision {
        if attempt + 1 >= self.max_attempts || !(self.is_retryable)(error) {
            return RetryDecision::Failed;
        }
        let delay_ms = self.base_delay.as_millis() as u64 * 2u64.pow(attempt);
        RetryDecision::Retry(Duration::from_millis(delay_ms))
    }

    /// Runs `op` until it succeeds, exhausts `max_attempts`, or returns a
    /// non-retryable error. Sleeps between attempts using the caller's
    /// async runtime.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => match self.should_retry(attempt, &err) {
                    RetryDecision::Retry(delay) => {
                        warn!(attempt, ?delay, error = %err, "retrying after transient error");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryDecision::Failed => return Err(err),
                },
            }
        }
    }
}
