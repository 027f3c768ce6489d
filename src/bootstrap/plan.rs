//! Setup plans: the marker plus the ordered steps that initialize a dataset.

use std::fmt;

use crate::store::{Query, QueryResult, Snapshot, StoreResult, TxOp, Value};

/// One ordered, batched mutation of the target.
///
/// The whole batch commits atomically, so a retried step never re-applies a
/// fraction of another step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupStep {
    pub name: String,
    pub ops: Vec<TxOp>,
}

impl SetupStep {
    pub fn new(name: impl Into<String>, ops: Vec<TxOp>) -> Self {
        Self {
            name: name.into(),
            ops,
        }
    }
}

/// Sentinel whose presence means the dataset was already initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A schema attribute with this ident exists.
    Attribute(String),
    /// An entity with this unique attribute value exists.
    Entity { attribute: String, value: Value },
}

impl Marker {
    /// Check for the marker with a single read.
    pub fn is_present(&self, snapshot: &Snapshot) -> StoreResult<bool> {
        match self {
            Marker::Attribute(ident) => match snapshot.read(&Query::Attribute(ident.clone()))? {
                QueryResult::Attribute(def) => Ok(def.is_some()),
                _ => Ok(false),
            },
            Marker::Entity { attribute, value } => {
                // No attribute yet means no entity either.
                if !snapshot.has_attribute(attribute) {
                    return Ok(false);
                }
                let query = Query::Lookup {
                    attribute: attribute.clone(),
                    value: value.clone(),
                };
                match snapshot.read(&query)? {
                    QueryResult::Entity(entity) => Ok(entity.is_some()),
                    _ => Ok(false),
                }
            }
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Attribute(ident) => write!(f, "attribute {}", ident),
            Marker::Entity { attribute, value } => write!(f, "entity {}={:?}", attribute, value),
        }
    }
}

/// Marker and ordered steps for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    pub marker: Marker,
    pub steps: Vec<SetupStep>,
}

impl SetupPlan {
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            steps: Vec::new(),
        }
    }

    /// Append a step; steps run in the order they are added.
    pub fn step(mut self, name: impl Into<String>, ops: Vec<TxOp>) -> Self {
        self.steps.push(SetupStep::new(name, ops));
        self
    }
}

/// Outcome of [`ensure_initialized`](crate::bootstrap::BootstrapCoordinator::ensure_initialized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStatus {
    /// Marker was present; nothing was written.
    AlreadyInitialized,
    /// Every step was applied.
    Initialized,
}

impl BootstrapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BootstrapStatus::AlreadyInitialized => "already-initialized",
            BootstrapStatus::Initialized => "initialized",
        }
    }
}

impl fmt::Display for BootstrapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
