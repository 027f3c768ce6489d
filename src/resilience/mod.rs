//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the store:
//!     → retries.rs (run the operation, loop on failure)
//!     → failure.rs (category decides retryable vs fatal)
//!     → policy.rs (predicate + schedule)
//!     → backoff.rs (linear delay for attempt n)
//! ```
//!
//! # Design Decisions
//! - Failures are values (`Result<T, ClassifiedFailure>`), never panics
//! - Retry decisions are pure functions of the failure and attempt number
//! - Only the policy bounds retries

pub mod backoff;
pub mod failure;
pub mod policy;
pub mod retries;

pub use failure::{classify, raise, raise_with, ClassifiedFailure, Classify, FailureCategory};
pub use policy::{policy_fn, FnPolicy, LinearPolicy, RetryPolicy};
pub use retries::RetryExecutor;
