//! Retry policies.
//!
//! A policy answers two questions for the executor: is this failure worth
//! retrying, and how long to wait before attempt `n + 1`. Policies hold no
//! mutable state; the same value can drive any number of concurrent calls.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::linear_backoff;
use crate::resilience::failure::ClassifiedFailure;

/// Pluggable retryability predicate plus backoff schedule.
pub trait RetryPolicy: Send + Sync {
    /// Whether `failure` may be retried at all.
    fn is_retryable(&self, failure: &ClassifiedFailure) -> bool;

    /// Delay after the 1-based `attempt` failed. `None` stops retrying.
    fn backoff(&self, attempt: u32) -> Option<Duration>;
}

/// Default policy: transient categories only, `step × attempt` for `max_attempts` retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearPolicy {
    pub step: Duration,
    pub max_attempts: u32,
}

impl Default for LinearPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(200),
            max_attempts: 10,
        }
    }
}

impl From<&RetryConfig> for LinearPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            step: Duration::from_millis(config.base_delay_ms),
            max_attempts: config.max_attempts,
        }
    }
}

impl RetryPolicy for LinearPolicy {
    fn is_retryable(&self, failure: &ClassifiedFailure) -> bool {
        failure.is_transient()
    }

    fn backoff(&self, attempt: u32) -> Option<Duration> {
        linear_backoff(attempt, self.step, self.max_attempts)
    }
}

/// Policy assembled from two closures.
pub struct FnPolicy<R, B> {
    retryable: R,
    backoff: B,
}

/// Build a [`RetryPolicy`] from a predicate and a schedule.
pub fn policy_fn<R, B>(retryable: R, backoff: B) -> FnPolicy<R, B>
where
    R: Fn(&ClassifiedFailure) -> bool + Send + Sync,
    B: Fn(u32) -> Option<Duration> + Send + Sync,
{
    FnPolicy { retryable, backoff }
}

impl<R, B> RetryPolicy for FnPolicy<R, B>
where
    R: Fn(&ClassifiedFailure) -> bool + Send + Sync,
    B: Fn(u32) -> Option<Duration> + Send + Sync,
{
    fn is_retryable(&self, failure: &ClassifiedFailure) -> bool {
        (self.retryable)(failure)
    }

    fn backoff(&self, attempt: u32) -> Option<Duration> {
        (self.backoff)(attempt)
    }
}

impl<P: RetryPolicy + ?Sized> RetryPolicy for &P {
    fn is_retryable(&self, failure: &ClassifiedFailure) -> bool {
        (**self).is_retryable(failure)
    }

    fn backoff(&self, attempt: u32) -> Option<Duration> {
        (**self).backoff(attempt)
    }
}
