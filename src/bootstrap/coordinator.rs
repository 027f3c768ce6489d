//! Idempotent bootstrap protocol.
//!
//! # Responsibilities
//! - Connect to the target dataset (retried)
//! - Read the marker once; stop if it is present
//! - Otherwise apply each setup step in order, each retried on its own
//!
//! # Design Decisions
//! - No state is kept between calls; the marker in the store is the only
//!   record of a completed bootstrap
//! - A transient failure in step k retries step k only
//! - No rollback: a fatal step failure may leave the dataset partially set up
//! - No cross-process lock. Two callers racing on an empty dataset may both
//!   apply the steps; steps must be safe to apply twice (schema re-definition
//!   is a no-op, data goes through unique-keyed upserts)

use std::sync::Arc;
use std::time::Instant;

use crate::bootstrap::plan::{BootstrapStatus, Marker, SetupPlan, SetupStep};
use crate::observability::metrics;
use crate::resilience::{ClassifiedFailure, LinearPolicy, RetryExecutor, RetryPolicy};
use crate::store::{Snapshot, StoreClient, StoreConnection};

/// Runs [`SetupPlan`]s against a store client.
pub struct BootstrapCoordinator<P = LinearPolicy> {
    client: Arc<dyn StoreClient>,
    executor: RetryExecutor<P>,
}

impl BootstrapCoordinator<LinearPolicy> {
    /// Coordinator using the default retry policy.
    pub fn with_default_policy(client: Arc<dyn StoreClient>) -> Self {
        Self::new(client, RetryExecutor::default())
    }
}

impl<P: RetryPolicy> BootstrapCoordinator<P> {
    pub fn new(client: Arc<dyn StoreClient>, executor: RetryExecutor<P>) -> Self {
        Self { client, executor }
    }

    /// Initialize `target` with `plan` unless its marker is already present.
    pub async fn ensure_initialized(
        &self,
        target: &str,
        plan: &SetupPlan,
    ) -> Result<BootstrapStatus, ClassifiedFailure> {
        let result = self.run(target, plan).await;
        match &result {
            Ok(status) => metrics::record_run(target, status.as_str()),
            Err(e) => {
                tracing::error!(dataset = target, error = %e, "Bootstrap failed");
                metrics::record_run(target, "failed");
            }
        }
        result
    }

    async fn run(&self, target: &str, plan: &SetupPlan) -> Result<BootstrapStatus, ClassifiedFailure> {
        let conn = self.connect(target).await?;

        if self.is_initialized(conn.as_ref(), &plan.marker).await? {
            tracing::info!(dataset = target, marker = %plan.marker, "Dataset already initialized");
            return Ok(BootstrapStatus::AlreadyInitialized);
        }

        tracing::info!(dataset = target, steps = plan.steps.len(), "Initializing dataset");
        for (index, step) in plan.steps.iter().enumerate() {
            self.apply_step(conn.as_ref(), index, step).await?;
        }

        tracing::info!(dataset = target, "Dataset initialized");
        Ok(BootstrapStatus::Initialized)
    }

    /// Connect to `target`, retrying transient failures.
    pub async fn connect(&self, target: &str) -> Result<Arc<dyn StoreConnection>, ClassifiedFailure> {
        self.executor
            .execute("connect", move || async move { self.client.connect(target).await.map_err(Into::into) })
            .await
    }

    /// Latest snapshot of `conn`, retrying transient failures.
    pub async fn snapshot(&self, conn: &dyn StoreConnection) -> Result<Snapshot, ClassifiedFailure> {
        self.executor
            .execute("snapshot", move || async move { conn.snapshot().await.map_err(Into::into) })
            .await
    }

    /// Report whether `marker` is present, with one snapshot and one read.
    pub async fn is_initialized(
        &self,
        conn: &dyn StoreConnection,
        marker: &Marker,
    ) -> Result<bool, ClassifiedFailure> {
        let snapshot = &self.snapshot(conn).await?;

        self.executor
            .execute("read-marker", move || async move { marker.is_present(snapshot).map_err(Into::into) })
            .await
    }

    async fn apply_step(
        &self,
        conn: &dyn StoreConnection,
        index: usize,
        step: &SetupStep,
    ) -> Result<(), ClassifiedFailure> {
        let started = Instant::now();
        let report = self
            .executor
            .execute(&step.name, move || async move { conn.transact(&step.ops).await.map_err(Into::into) })
            .await?;

        metrics::record_step(&step.name, started);
        tracing::info!(
            dataset = conn.target(),
            step = %step.name,
            index,
            ops = step.ops.len(),
            basis_t = report.basis_t,
            tx_id = %report.tx_id,
            "Setup step applied"
        );
        Ok(())
    }
}
