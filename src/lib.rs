//! Resilient dataset bootstrapper.
//!
//! Wraps calls to a transactional store in a retry/backoff executor and uses
//! it to initialize a named dataset exactly once, however many times (or from
//! however many processes) the bootstrap is invoked.

// Core
pub mod bootstrap;
pub mod resilience;
pub mod store;

// Datasets
pub mod dataset;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use bootstrap::{BootstrapCoordinator, BootstrapStatus, SetupPlan, SetupRegistry};
pub use config::AppConfig;
pub use resilience::{ClassifiedFailure, FailureCategory, RetryExecutor, RetryPolicy};
