//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber once per process
//! - Pick pretty or JSON output from config
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - Installing twice is reported as an error, not a panic

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("logging already initialized: {0}")]
pub struct LoggingError(#[from] tracing_subscriber::util::TryInitError);

/// Install the global subscriber described by `config`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = env_filter(&config.log_level);
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dataset_bootstrap={level},warn")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_cleanly() {
        let config = ObservabilityConfig::default();
        // Another test may have installed a subscriber first; either way the
        // second call in this test must not panic.
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
