//! Immutable database values.
//!
//! # Invariants
//! - A `Database` is never mutated once published; writers apply a batch to a
//!   copy and swap it in whole.
//! - Every `Upsert` attribute is defined in `schema` with a matching value type.
//! - At most one entity holds a given value of a unique attribute.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{AttributeDef, Cardinality, EntityId, EntityMap, Query, QueryResult, TxOp, Value};

/// Full state of one named database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub(crate) basis_t: u64,
    pub(crate) next_id: u64,
    pub(crate) schema: BTreeMap<String, AttributeDef>,
    pub(crate) entities: BTreeMap<EntityId, EntityMap>,
}

impl Database {
    /// Apply a batch in order. On error `self` may be half-updated; callers
    /// apply to a copy and discard it.
    pub(crate) fn apply(&mut self, ops: &[TxOp]) -> StoreResult<Vec<EntityId>> {
        let mut touched = Vec::new();

        for op in ops {
            match op {
                TxOp::DefineAttribute(def) => self.define(def)?,
                TxOp::Upsert(pairs) => touched.push(self.upsert(pairs)?),
            }
        }

        self.basis_t += 1;
        Ok(touched)
    }

    fn define(&mut self, def: &AttributeDef) -> StoreResult<()> {
        if def.ident.is_empty() {
            return Err(StoreError::InvalidTx("attribute ident must not be empty".to_string()));
        }

        match self.schema.get(&def.ident) {
            Some(existing) if existing == def => Ok(()),
            Some(_) => Err(StoreError::InvalidTx(format!(
                "attribute '{}' is already defined with a different schema",
                def.ident
            ))),
            None => {
                self.schema.insert(def.ident.clone(), def.clone());
                Ok(())
            }
        }
    }

    fn upsert(&mut self, pairs: &[(String, Value)]) -> StoreResult<EntityId> {
        if pairs.is_empty() {
            return Err(StoreError::InvalidTx("upsert without attributes".to_string()));
        }

        let mut target: Option<EntityId> = None;
        for (attribute, value) in pairs {
            let def = self.schema.get(attribute).ok_or_else(|| {
                StoreError::InvalidTx(format!("attribute '{}' is not defined", attribute))
            })?;

            if value.value_type() != def.value_type {
                return Err(StoreError::InvalidTx(format!(
                    "attribute '{}' expects {:?}, got {:?}",
                    attribute,
                    def.value_type,
                    value.value_type()
                )));
            }

            if let Value::Ref(id) = value {
                if !self.entities.contains_key(id) {
                    return Err(StoreError::InvalidTx(format!("ref to unknown entity {}", id)));
                }
            }

            if def.unique {
                if let Some(found) = self.lookup(attribute, value) {
                    match target {
                        Some(existing) if existing != found => {
                            return Err(StoreError::InvalidTx(format!(
                                "unique values resolve to different entities {} and {}",
                                existing, found
                            )));
                        }
                        _ => target = Some(found),
                    }
                }
            }
        }

        let id = match target {
            Some(id) => id,
            None => {
                self.next_id += 1;
                EntityId(self.next_id)
            }
        };

        let cardinalities: Vec<Cardinality> = pairs
            .iter()
            .map(|(attribute, _)| self.schema[attribute].cardinality)
            .collect();
        let entity = self.entities.entry(id).or_default();
        for ((attribute, value), cardinality) in pairs.iter().zip(cardinalities) {
            let values = entity.entry(attribute.clone()).or_default();
            match cardinality {
                Cardinality::One => *values = vec![value.clone()],
                Cardinality::Many => {
                    if !values.contains(value) {
                        values.push(value.clone());
                    }
                }
            }
        }

        Ok(id)
    }

    fn lookup(&self, attribute: &str, value: &Value) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, attrs)| attrs.get(attribute).is_some_and(|vals| vals.contains(value)))
            .map(|(id, _)| *id)
    }
}

/// Read-only view of a database at one basis.
#[derive(Debug, Clone)]
pub struct Snapshot {
    target: String,
    db: Arc<Database>,
}

impl Snapshot {
    pub(crate) fn new(target: impl Into<String>, db: Arc<Database>) -> Self {
        Self {
            target: target.into(),
            db,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn basis_t(&self) -> u64 {
        self.db.basis_t
    }

    pub fn has_attribute(&self, ident: &str) -> bool {
        self.db.schema.contains_key(ident)
    }

    /// Run `query` against this snapshot.
    pub fn read(&self, query: &Query) -> StoreResult<QueryResult> {
        match query {
            Query::Attribute(ident) => Ok(QueryResult::Attribute(self.db.schema.get(ident).cloned())),
            Query::Lookup { attribute, value } => {
                let def = self.attribute(attribute)?;
                if !def.unique {
                    return Err(StoreError::InvalidQuery(format!(
                        "attribute '{}' is not unique",
                        attribute
                    )));
                }
                let entity = self
                    .db
                    .lookup(attribute, value)
                    .and_then(|id| self.db.entities.get(&id).map(|attrs| (id, attrs.clone())));
                Ok(QueryResult::Entity(entity))
            }
            Query::Values(attribute) => {
                self.attribute(attribute)?;
                let values = self
                    .db
                    .entities
                    .iter()
                    .flat_map(|(id, attrs)| {
                        attrs
                            .get(attribute)
                            .into_iter()
                            .flatten()
                            .map(move |value| (*id, value.clone()))
                    })
                    .collect();
                Ok(QueryResult::Values(values))
            }
        }
    }

    fn attribute(&self, ident: &str) -> StoreResult<&AttributeDef> {
        self.db
            .schema
            .get(ident)
            .ok_or_else(|| StoreError::NotFound(format!("attribute '{}' in '{}'", ident, self.target)))
    }
}
