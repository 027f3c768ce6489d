//! In-process store with optional JSON persistence.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tempfile::NamedTempFile;

use crate::store::error::{StoreError, StoreResult};
use crate::store::snapshot::{Database, Snapshot};
use crate::store::types::{TxOp, TxReport};
use crate::store::{StoreClient, StoreConnection};

/// A thread-safe store holding named databases.
///
/// Cloning is cheap; clones share the same databases.
#[derive(Clone, Default)]
pub struct MemoryStore {
    databases: Arc<DashMap<String, Arc<Database>>>,
    persistence_path: Option<PathBuf>,
    /// Serializes writes of the persistence file.
    save_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Create an empty store that only lives in this process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store persisted at `path`, loading it if the file exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self {
            persistence_path: Some(path.to_path_buf()),
            ..Self::default()
        };

        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<String, Database> = serde_json::from_reader(reader)?;
            for (name, db) in map {
                store.databases.insert(name, Arc::new(db));
            }
            tracing::info!(path = %path.display(), databases = store.databases.len(), "Loaded store from file");
        }

        Ok(store)
    }

    /// Names of all databases, sorted.
    pub fn database_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.databases.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    fn current(&self, target: &str) -> StoreResult<Arc<Database>> {
        self.databases
            .get(target)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("database '{}'", target)))
    }

    fn commit(&self, target: &str, ops: &[TxOp]) -> StoreResult<TxReport> {
        let report = {
            let mut entry = self
                .databases
                .get_mut(target)
                .ok_or_else(|| StoreError::NotFound(format!("database '{}'", target)))?;

            let mut next = Database::clone(entry.value());
            let entity_ids = next.apply(ops)?;
            let report = TxReport {
                basis_t: next.basis_t,
                tx_id: uuid::Uuid::new_v4(),
                entity_ids,
            };
            *entry.value_mut() = Arc::new(next);
            report
        };

        // The shard guard above must be released before iterating for the save.
        self.save_to_file()?;
        Ok(report)
    }

    /// Write every database to the persistence file, if one is configured.
    pub fn save_to_file(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let _guard = self.save_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let map: HashMap<String, Database> = self
            .databases
            .iter()
            .map(|r| (r.key().clone(), Database::clone(r.value())))
            .collect();

        // Write a sibling file and rename it over the target so a crash never
        // leaves a truncated store behind.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::from(e.error))?;
        tracing::debug!(path = %path.display(), databases = map.len(), "Saved store to file");
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("databases", &self.databases.len())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn connect(&self, target: &str) -> StoreResult<Arc<dyn StoreConnection>> {
        if target.is_empty() {
            return Err(StoreError::NotFound("database name must not be empty".to_string()));
        }

        if !self.databases.contains_key(target) {
            self.databases
                .entry(target.to_string())
                .or_insert_with(|| Arc::new(Database::default()));
            tracing::info!(database = target, "Created database");
        }

        Ok(Arc::new(MemoryConnection {
            target: target.to_string(),
            store: self.clone(),
        }))
    }
}

/// Connection bound to one database of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    target: String,
    store: MemoryStore,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    fn target(&self) -> &str {
        &self.target
    }

    async fn snapshot(&self) -> StoreResult<Snapshot> {
        let db = self.store.current(&self.target)?;
        Ok(Snapshot::new(self.target.clone(), db))
    }

    async fn transact(&self, ops: &[TxOp]) -> StoreResult<TxReport> {
        self.store.commit(&self.target, ops)
    }
}
