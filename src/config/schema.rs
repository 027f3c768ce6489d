//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the bootstrapper.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Store client settings. Required: there is no default store.
    pub store: StoreConfig,

    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Bootstrap settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Configuration pointing at the given store URI, everything else defaulted.
    pub fn for_store(uri: impl Into<String>) -> Self {
        Self {
            store: StoreConfig {
                uri: uri.into(),
                credentials: None,
            },
            retry: RetryConfig::default(),
            bootstrap: BootstrapConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Store client configuration.
#[derive(Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Store endpoint (e.g., "mem://local" or "file:///var/lib/dataset/store.json").
    pub uri: String,

    /// Opaque credentials handed to the client. Never logged.
    #[serde(default)]
    pub credentials: Option<String>,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("uri", &self.uri)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Retry configuration for the default linear policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay step in milliseconds; retry `n` waits `n × base_delay_ms`.
    pub base_delay_ms: u64,

    /// Number of retries after the first attempt.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 200,
            max_attempts: 10,
        }
    }
}

/// Bootstrap configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Target dataset initialized at startup.
    pub target: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            target: "catalog".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
