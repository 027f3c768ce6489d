//! Retry execution.
//!
//! # Responsibilities
//! - Run an operation until it succeeds, fails fatally, or the policy stops
//! - Surface the last failure unchanged when giving up
//!
//! # Design Decisions
//! - The policy is the only bound on attempts; the executor adds no cap
//! - Backoff uses `tokio::time::sleep`, so waiting yields to the runtime
//!   and holds no lock
//! - The executor is stateless apart from its policy

use std::future::Future;

use crate::observability::metrics;
use crate::resilience::failure::ClassifiedFailure;
use crate::resilience::policy::{LinearPolicy, RetryPolicy};

/// Executes operations under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryExecutor<P = LinearPolicy> {
    policy: P,
}

impl Default for RetryExecutor<LinearPolicy> {
    fn default() -> Self {
        Self::new(LinearPolicy::default())
    }
}

impl<P: RetryPolicy> RetryExecutor<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Run `op` until it returns `Ok`, or return the failure that ended the loop.
    ///
    /// `operation` names the call in logs and metrics.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ClassifiedFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClassifiedFailure>>,
    {
        let mut attempt: u32 = 1;

        loop {
            let failure = match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(operation, attempts = attempt, "Operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            if !self.policy.is_retryable(&failure) {
                tracing::debug!(
                    operation,
                    attempt,
                    category = %failure.category(),
                    error = %failure,
                    "Non-retryable failure"
                );
                metrics::record_failure(operation, failure.category(), "fatal");
                return Err(failure);
            }

            let Some(delay) = self.policy.backoff(attempt) else {
                tracing::warn!(
                    operation,
                    attempts = attempt,
                    category = %failure.category(),
                    error = %failure,
                    "Retries exhausted"
                );
                metrics::record_failure(operation, failure.category(), "exhausted");
                return Err(failure);
            };

            tracing::info!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                category = %failure.category(),
                error = %failure,
                "Retrying after transient failure"
            );
            metrics::record_retry(operation, failure.category());

            tokio::time::sleep(delay).await;
            attempt = attempt.saturating_add(1);
        }
    }
}
