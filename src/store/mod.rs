//! Transactional store collaborator.
//!
//! # Data Flow
//! ```text
//! StoreConfig (uri, credentials)
//!     → connect_client (pick client by uri scheme)
//!     → StoreClient::connect(target)      → StoreConnection
//!     → StoreConnection::snapshot()       → Snapshot (immutable)
//!     → Snapshot::read(query)             → QueryResult
//!     → StoreConnection::transact(ops)    → TxReport
//! ```
//!
//! # Design Decisions
//! - Everything above is opaque to the bootstrap core; it only sees
//!   `StoreError`, mapped 1:1 onto failure categories at this boundary
//! - A transaction batch is all-or-nothing
//! - The bundled client is in-process (`mem://`) or file-backed (`file://`)

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::StoreConfig;

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use types::{AttributeDef, Cardinality, EntityId, Query, QueryResult, TxOp, TxReport, Value, ValueType};

/// Handle to a store service. Shared by all callers once built.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Connect to the named database.
    async fn connect(&self, target: &str) -> StoreResult<Arc<dyn StoreConnection>>;
}

/// Session bound to one database.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    fn target(&self) -> &str;

    /// Latest committed database value.
    async fn snapshot(&self) -> StoreResult<Snapshot>;

    /// Apply `ops` as one atomic batch.
    async fn transact(&self, ops: &[TxOp]) -> StoreResult<TxReport>;
}

/// Build a client for the configured store URI.
pub fn connect_client(config: &StoreConfig) -> StoreResult<Arc<dyn StoreClient>> {
    let url = Url::parse(&config.uri)
        .map_err(|e| StoreError::Unsupported(format!("{}: {}", config.uri, e)))?;

    match url.scheme() {
        "mem" => {
            tracing::info!(uri = %config.uri, "Using in-process store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| StoreError::Unsupported(format!("{}: not a local path", config.uri)))?;
            tracing::info!(path = %path.display(), "Using file-backed store");
            Ok(Arc::new(MemoryStore::open(path)?))
        }
        other => Err(StoreError::Unsupported(format!("scheme '{}'", other))),
    }
}
