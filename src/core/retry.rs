use crate::core::cancel::CancellationFlag;
use crate::domain::model::ParcelStatus;
use crate::domain::ports::StatusFetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Retry configuration for transient fetch failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

pub struct RetryingFetcher<F: StatusFetcher> {
    inner: F,
    policy: RetryPolicy,
    cancel: CancellationFlag,
}

impl<F: StatusFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            cancel: CancellationFlag::new(),
        }
    }

    /// Stops retrying once `cancel` is set; the last error is returned as is.
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl<F: StatusFetcher> StatusFetcher for RetryingFetcher<F> {
    async fn fetch_status(&self, tracking_number: &str) -> Result<ParcelStatus> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_status(tracking_number).await {
                Ok(status) => return Ok(status),
                Err(e) if self.cancel.is_cancelled() => return Err(e),
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        "🔁 Attempt {}/{} for {} failed: {} (retrying in {:?})",
                        attempt,
                        self.policy.max_attempts,
                        tracking_number,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    if self.cancel.is_cancelled() {
                        return Err(e);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
