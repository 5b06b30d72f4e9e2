use std::{future::Future, time::Duration};

use anyhow::Error;
use tokio::time::sleep;
use tracing::warn;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    const BACKOFF_CAP: Duration = Duration::from_secs(10);

    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff: initial_backoff.max(Self::BACKOFF_CAP),
        }
    }

    /// Wait before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds or the retries run out. Every failure is
    /// retried. `op` receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, Error>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0u32;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_retries => {
                    return Err(err.context(format!("giving up after {} attempts", attempt + 1)));
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "oracle call failed; retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
