//! Store data types: schema, transaction ops, queries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Long(i64),
    Bool(bool),
    Ref(EntityId),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Long(_) => ValueType::Long,
            Value::Bool(_) => ValueType::Bool,
            Value::Ref(_) => ValueType::Ref,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Long,
    Bool,
    Ref,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

/// Schema definition of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Namespaced identifier, e.g. "movie/title".
    pub ident: String,
    pub value_type: ValueType,
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Unique identity: upserts keyed on this attribute merge into the existing entity.
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub doc: Option<String>,
}

impl AttributeDef {
    pub fn new(ident: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            ident: ident.into(),
            value_type,
            cardinality: Cardinality::One,
            unique: false,
            doc: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn many(mut self) -> Self {
        self.cardinality = Cardinality::Many;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// Attribute → values for one entity.
pub type EntityMap = BTreeMap<String, Vec<Value>>;

/// One operation inside a transaction batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOp {
    /// Install an attribute. Re-defining an identical attribute is a no-op.
    DefineAttribute(AttributeDef),
    /// Assert attribute values. If any unique attribute matches an existing
    /// entity the values are merged into it, otherwise a new entity is created.
    Upsert(Vec<(String, Value)>),
}

impl TxOp {
    /// Build an upsert from `(attribute, value)` pairs.
    pub fn upsert<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        TxOp::Upsert(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Result of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReport {
    /// Database basis after the transaction.
    pub basis_t: u64,
    pub tx_id: uuid::Uuid,
    /// Entity touched by each `Upsert`, in op order.
    pub entity_ids: Vec<EntityId>,
}

/// Read request against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Schema definition of an attribute.
    Attribute(String),
    /// Entity whose unique `attribute` equals `value`.
    Lookup { attribute: String, value: Value },
    /// Every `(entity, value)` pair asserted for `attribute`.
    Values(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Attribute(Option<AttributeDef>),
    Entity(Option<(EntityId, EntityMap)>),
    Values(Vec<(EntityId, Value)>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_builder() {
        let op = TxOp::upsert([("movie/title", Value::from("Alien")), ("movie/release-year", Value::from(1979))]);
        assert_eq!(
            op,
            TxOp::Upsert(vec![
                ("movie/title".to_string(), Value::String("Alien".to_string())),
                ("movie/release-year".to_string(), Value::Long(1979)),
            ])
        );
    }

    #[test]
    fn test_attribute_builder() {
        let def = AttributeDef::new("movie/genre", ValueType::String).many().doc("Genres");
        assert_eq!(def.cardinality, Cardinality::Many);
        assert!(!def.unique);
        assert_eq!(def.doc.as_deref(), Some("Genres"));
    }
}
