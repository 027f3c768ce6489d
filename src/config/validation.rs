//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the store URI names a supported scheme
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// Store URI schemes the bundled client understands.
pub const SUPPORTED_SCHEMES: &[&str] = &["mem", "file"];

const LOG_FORMATS: &[&str] = &["pretty", "json"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("store.uri '{uri}' is not a valid URI: {reason}")]
    InvalidStoreUri { uri: String, reason: String },

    #[error("store.uri scheme '{0}' is not supported")]
    UnsupportedScheme(String),

    #[error("retry.base_delay_ms must be greater than zero")]
    ZeroBaseDelay,

    #[error("bootstrap.target must not be empty")]
    EmptyTarget,

    #[error("observability.log_format '{0}' is not one of pretty, json")]
    UnknownLogFormat(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.store.uri) {
        Ok(url) if !SUPPORTED_SCHEMES.contains(&url.scheme()) => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidStoreUri {
            uri: config.store.uri.clone(),
            reason: e.to_string(),
        }),
    }

    if config.retry.base_delay_ms == 0 {
        errors.push(ValidationError::ZeroBaseDelay);
    }

    if config.bootstrap.target.trim().is_empty() {
        errors.push(ValidationError::EmptyTarget);
    }

    let format = config.observability.log_format.as_str();
    if !LOG_FORMATS.contains(&format) {
        errors.push(ValidationError::UnknownLogFormat(format.to_string()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
