//! Process-wide store client handle.
//!
//! # Invariants
//! - The client is built at most once per [`ClientCache`] and never mutated
//!   afterwards; every caller gets a clone of the same `Arc`.
//! - Concurrent first use runs a single construction; the others wait for it.
//! - A failed construction leaves the cache empty, so a later call may retry.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::StoreConfig;
use crate::resilience::{ClassifiedFailure, RetryExecutor, RetryPolicy};
use crate::store::{connect_client, StoreClient};

/// Lazily-initialized, construct-once client slot.
pub struct ClientCache {
    cell: OnceCell<Arc<dyn StoreClient>>,
}

impl ClientCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the cached client, building it from `config` on first use.
    ///
    /// `config` is only read by the call that performs construction.
    pub async fn get_or_connect<P: RetryPolicy>(
        &self,
        config: &StoreConfig,
        executor: &RetryExecutor<P>,
    ) -> Result<Arc<dyn StoreClient>, ClassifiedFailure> {
        self.get_or_build(executor, move || async move { connect_client(config).map_err(Into::into) })
            .await
    }

    /// Like [`get_or_connect`](Self::get_or_connect) with a custom constructor.
    pub async fn get_or_build<P, F, Fut>(
        &self,
        executor: &RetryExecutor<P>,
        build: F,
    ) -> Result<Arc<dyn StoreClient>, ClassifiedFailure>
    where
        P: RetryPolicy,
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Arc<dyn StoreClient>, ClassifiedFailure>>,
    {
        let client = self
            .cell
            .get_or_try_init(move || async move {
                let client = executor.execute("client", build).await?;
                tracing::info!("Store client initialized");
                Ok::<_, ClassifiedFailure>(client)
            })
            .await?;
        Ok(Arc::clone(client))
    }

    pub fn get(&self) -> Option<Arc<dyn StoreClient>> {
        self.cell.get().cloned()
    }
}

impl Default for ClientCache {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: ClientCache = ClientCache::new();

/// The client shared by the whole process, built from `config` on first use.
pub async fn shared_client<P: RetryPolicy>(
    config: &StoreConfig,
    executor: &RetryExecutor<P>,
) -> Result<Arc<dyn StoreClient>, ClassifiedFailure> {
    SHARED.get_or_connect(config, executor).await
}
