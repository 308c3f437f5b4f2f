use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Attempt budget and backoff for one kind of request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Base delay, multiplied by the number of failed attempts so far
    pub backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delay to wait after `failed` attempts have failed
    #[must_use]
    pub fn delay_after(&self, failed: u32) -> Duration {
        self.backoff * failed
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Run `action` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
pub async fn retry<F, Fut, T>(op: &str, policy: &RetryPolicy, mut action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut failed = 0;

    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                failed += 1;
                if failed >= attempts || !err.is_retryable() {
                    error!("{} failed after {} attempt(s): {}", op, failed, err);
                    return Err(err);
                }

                let delay = policy.delay_after(failed);
                warn!(
                    "{} failed (attempt {}/{}): {}. retrying in {:?}",
                    op, failed, attempts, err, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
