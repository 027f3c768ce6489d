//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging and metrics from validated configuration
//! - Resolve the dataset's setup plan
//! - Obtain the shared store client and run the bootstrap protocol
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps initialize in order, not concurrently

use std::net::SocketAddr;

use thiserror::Error;

use crate::bootstrap::{shared_client, BootstrapCoordinator, BootstrapStatus, SetupRegistry};
use crate::config::{AppConfig, ConfigError, ObservabilityConfig};
use crate::observability::logging::{init_logging, LoggingError};
use crate::observability::metrics::init_metrics;
use crate::resilience::{ClassifiedFailure, LinearPolicy, RetryExecutor};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("invalid metrics address '{address}': {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] ClassifiedFailure),
}

/// Install logging and, when enabled, the metrics exporter.
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), StartupError> {
    let metrics_addr = if config.metrics_enabled {
        let addr = config
            .metrics_address
            .parse::<SocketAddr>()
            .map_err(|source| StartupError::MetricsAddress {
                address: config.metrics_address.clone(),
                source,
            })?;
        Some(addr)
    } else {
        None
    };

    init_logging(config)?;

    if let Some(addr) = metrics_addr {
        init_metrics(addr)?;
        tracing::info!(metrics_address = %addr, "Metrics exporter listening");
    }

    Ok(())
}

/// Retry executor built from the `[retry]` section.
pub fn executor_for(config: &AppConfig) -> RetryExecutor<LinearPolicy> {
    RetryExecutor::new(LinearPolicy::from(&config.retry))
}

/// Coordinator over the process-wide client.
pub async fn coordinator_for(config: &AppConfig) -> Result<BootstrapCoordinator, ClassifiedFailure> {
    let executor = executor_for(config);
    let client = shared_client(&config.store, &executor).await?;
    Ok(BootstrapCoordinator::new(client, executor))
}

/// Initialize `dataset` from its registered plan.
pub async fn bootstrap(
    config: &AppConfig,
    registry: &SetupRegistry,
    dataset: &str,
) -> Result<BootstrapStatus, StartupError> {
    let plan = registry.require(dataset)?;

    tracing::info!(
        dataset,
        store = %config.store.uri,
        max_attempts = config.retry.max_attempts,
        base_delay_ms = config.retry.base_delay_ms,
        "Bootstrapping dataset"
    );

    let coordinator = coordinator_for(config).await?;
    let status = coordinator.ensure_initialized(dataset, plan).await?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_metrics_address_fails_startup() {
        let config = ObservabilityConfig {
            metrics_enabled: true,
            metrics_address: "not-an-address".to_string(),
            ..ObservabilityConfig::default()
        };

        match init_observability(&config) {
            Err(StartupError::MetricsAddress { address, .. }) => assert_eq!(address, "not-an-address"),
            other => panic!("expected MetricsAddress, got {:?}", other),
        }
    }
}
