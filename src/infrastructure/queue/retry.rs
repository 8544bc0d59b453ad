use crate::domain::generation::PipelineError;
use crate::infrastructure::config::JobConfig;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_retry2::{strategy::ExponentialBackoff, Retry, RetryError};
use uuid::Uuid;

/// Redelivery policy for one unit of work.
///
/// The n-th wait (n starting at 1) is `backoff_unit * backoff_base^n`, so with
/// `backoff_base >= 2` every wait is strictly longer than the one before.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub backoff_unit: Duration,
    pub backoff_base: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&JobConfig::default())
    }
}

impl From<&JobConfig> for RetryPolicy {
    fn from(config: &JobConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
            backoff_base: config.backoff_base,
        }
    }
}

impl RetryPolicy {
    /// Waits between attempts; one fewer than `max_attempts`
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let unit_ms = u64::try_from(self.backoff_unit.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(self.backoff_base)
            .factor(unit_ms)
            .take(self.max_attempts.saturating_sub(1))
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempts
    /// run out. The closure receives the 1-based attempt number.
    pub async fn execute<F, Fut>(&self, generation_id: Uuid, operation: F) -> Result<(), PipelineError>
    where
        F: Fn(usize) -> Fut + Send + Sync,
        Fut: Future<Output = Result<(), PipelineError>> + Send,
    {
        let attempts = AtomicUsize::new(0);
        let max_attempts = self.max_attempts;

        Retry::spawn(self.delays(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let run = operation(attempt);
            async move {
                match run.await {
                    Ok(()) => Ok(()),
                    Err(err) if err.is_retryable() => {
                        if attempt < max_attempts {
                            tracing::warn!(
                                generation_id = %generation_id,
                                attempt = attempt,
                                max_attempts = max_attempts,
                                error = %err,
                                "Generation attempt failed, will retry"
                            );
                        }
                        Err(RetryError::Transient {
                            err,
                            retry_after: None,
                        })
                    }
                    Err(err) => Err(RetryError::Permanent(err)),
                }
            }
        })
        .await
    }
}
