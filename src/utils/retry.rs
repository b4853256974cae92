use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff: the wait before attempt `n + 1` is `initial_delay * 2^(n - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_tries: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_tries: u32, initial_delay: Duration) -> Self {
        Self {
            max_tries,
            initial_delay,
        }
    }

    /// Wait after the `failed_tries`-th failure.
    pub fn delay_for(&self, failed_tries: u32) -> Duration {
        let exponent = failed_tries.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or runs out of tries.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut tries = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                tries += 1;
                if tries >= policy.max_tries {
                    return Err(e);
                }
                let wait = policy.delay_for(tries);
                tracing::warn!(
                    "Retrying {} in {:.2} seconds... (attempt {}/{})",
                    label,
                    wait.as_secs_f64(),
                    tries,
                    policy.max_tries
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}
