//! Shared utilities for integration testing.
//!
//! [`FlakyStore`] wraps a [`MemoryStore`] and fails scripted calls with a
//! chosen error kind, recording every call it sees.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dataset_bootstrap::store::{
    AttributeDef, MemoryStore, Snapshot, StoreClient, StoreConnection, StoreError, StoreResult, TxOp,
    TxReport, ValueType,
};

/// Store call site a fault can be injected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Point {
    Connect,
    Snapshot,
    Transact,
}

/// Kind of error an injected fault raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Busy,
    Unavailable,
    Interrupted,
    NotFound,
    Rejected,
}

impl FaultKind {
    fn to_error(self, point: Point) -> StoreError {
        let msg = format!("injected at {:?}", point);
        match self {
            FaultKind::Busy => StoreError::Busy(msg),
            FaultKind::Unavailable => StoreError::Unavailable(msg),
            FaultKind::Interrupted => StoreError::Interrupted(msg),
            FaultKind::NotFound => StoreError::NotFound(msg),
            FaultKind::Rejected => StoreError::InvalidTx(msg),
        }
    }
}

/// One observed store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub point: Point,
    /// First attribute named by the batch; empty for non-transact calls.
    pub label: String,
    pub failed: bool,
}

#[derive(Debug, Default)]
struct Faults {
    script: Mutex<HashMap<Point, VecDeque<Option<FaultKind>>>>,
    calls: Mutex<Vec<Call>>,
}

impl Faults {
    fn check(&self, point: Point, label: String) -> StoreResult<()> {
        let fault = self
            .script
            .lock()
            .unwrap()
            .get_mut(&point)
            .and_then(VecDeque::pop_front)
            .flatten();

        self.calls.lock().unwrap().push(Call {
            point,
            label,
            failed: fault.is_some(),
        });

        match fault {
            Some(kind) => Err(kind.to_error(point)),
            None => Ok(()),
        }
    }
}

/// Fault-injecting wrapper around an in-process store.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    faults: Arc<Faults>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            faults: Arc::default(),
        }
    }

    /// Script the next calls at `point`: `None` passes, `Some(kind)` fails.
    /// Calls beyond the script pass.
    pub fn script(&self, point: Point, outcomes: impl IntoIterator<Item = Option<FaultKind>>) {
        self.faults
            .script
            .lock()
            .unwrap()
            .entry(point)
            .or_default()
            .extend(outcomes);
    }

    /// Fail the next `times` calls at `point` with `kind`.
    pub fn fail_next(&self, point: Point, kind: FaultKind, times: usize) {
        self.script(point, std::iter::repeat(Some(kind)).take(times));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.faults.calls.lock().unwrap().clone()
    }

    pub fn count(&self, point: Point) -> usize {
        self.calls().iter().filter(|c| c.point == point).count()
    }

    /// Labels of every transact call, in order, failed attempts included.
    pub fn transact_labels(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.point == Point::Transact)
            .map(|c| c.label)
            .collect()
    }

    pub fn reset_calls(&self) {
        self.faults.calls.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl StoreClient for FlakyStore {
    async fn connect(&self, target: &str) -> StoreResult<Arc<dyn StoreConnection>> {
        self.faults.check(Point::Connect, String::new())?;
        let inner = self.inner.connect(target).await?;
        Ok(Arc::new(FlakyConnection {
            inner,
            faults: Arc::clone(&self.faults),
        }))
    }
}

struct FlakyConnection {
    inner: Arc<dyn StoreConnection>,
    faults: Arc<Faults>,
}

#[async_trait]
impl StoreConnection for FlakyConnection {
    fn target(&self) -> &str {
        self.inner.target()
    }

    async fn snapshot(&self) -> StoreResult<Snapshot> {
        self.faults.check(Point::Snapshot, String::new())?;
        self.inner.snapshot().await
    }

    async fn transact(&self, ops: &[TxOp]) -> StoreResult<TxReport> {
        self.faults.check(Point::Transact, label(ops))?;
        self.inner.transact(ops).await
    }
}

fn label(ops: &[TxOp]) -> String {
    match ops.first() {
        Some(TxOp::DefineAttribute(def)) => def.ident.clone(),
        Some(TxOp::Upsert(pairs)) => pairs.first().map(|(a, _)| a.clone()).unwrap_or_default(),
        None => String::new(),
    }
}

/// A step that defines a single boolean attribute named `ident`.
pub fn define(ident: &str) -> Vec<TxOp> {
    vec![TxOp::DefineAttribute(AttributeDef::new(ident, ValueType::Bool))]
}
