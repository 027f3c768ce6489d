//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bootstrap_operation_retries_total` (counter): retries by operation, category
//! - `bootstrap_operation_failures_total` (counter): surfaced failures by operation, category, reason
//! - `bootstrap_runs_total` (counter): bootstrap outcomes by dataset, status
//! - `bootstrap_step_duration_seconds` (histogram): wall time per setup step
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::FailureCategory;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_retry(operation: &str, category: FailureCategory) {
    counter!(
        "bootstrap_operation_retries_total",
        "operation" => operation.to_string(),
        "category" => category.as_str()
    )
    .increment(1);
}

pub fn record_failure(operation: &str, category: FailureCategory, reason: &'static str) {
    counter!(
        "bootstrap_operation_failures_total",
        "operation" => operation.to_string(),
        "category" => category.as_str(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_run(dataset: &str, status: &'static str) {
    counter!(
        "bootstrap_runs_total",
        "dataset" => dataset.to_string(),
        "status" => status
    )
    .increment(1);
}

pub fn record_step(step: &str, started: Instant) {
    histogram!("bootstrap_step_duration_seconds", "step" => step.to_string())
        .record(started.elapsed().as_secs_f64());
}
