//! Dataset name → setup plan registry.

use std::collections::HashMap;

use crate::bootstrap::plan::SetupPlan;
use crate::dataset;
use crate::resilience::{ClassifiedFailure, FailureCategory};

/// Static mapping from dataset names to their setup plans.
#[derive(Debug, Clone, Default)]
pub struct SetupRegistry {
    plans: HashMap<String, SetupPlan>,
}

impl SetupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every dataset shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(dataset::CATALOG, dataset::catalog_plan());
        registry
    }

    /// Register `plan` under `name`, replacing any previous plan.
    pub fn register(&mut self, name: impl Into<String>, plan: SetupPlan) -> &mut Self {
        self.plans.insert(name.into(), plan);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&SetupPlan> {
        self.plans.get(name)
    }

    /// Like [`resolve`](Self::resolve), failing with `NotFound` on a miss.
    pub fn require(&self, name: &str) -> Result<&SetupPlan, ClassifiedFailure> {
        self.resolve(name).ok_or_else(|| {
            ClassifiedFailure::new(
                FailureCategory::NotFound,
                format!("no setup plan registered for dataset '{}'", name),
            )
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.plans.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
