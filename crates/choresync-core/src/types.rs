//! Document model: the shape of everything read from the store.
//!
//! Collections are addressed by slash-separated paths with an odd number of
//! segments (`users`, `households/h1/chores`). Documents are an id plus a
//! field map of typed [`Value`]s.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ChoreSyncError, Result};

/// JSON key marking a timestamp in the wire/fixture form: `{"$timestamp": "<rfc3339>"}`.
pub const TIMESTAMP_KEY: &str = "$timestamp";

pub type Fields = BTreeMap<String, Value>;

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Order two values of the same kind. Integers and doubles compare
    /// numerically; any other mix of kinds is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Double(b)) => (*a as f64).partial_cmp(b),
            (Value::Double(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Equality as used by `==` query predicates.
    pub fn matches_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Convert from JSON. Objects of the form `{"$timestamp": "..."}` become
    /// timestamps; an unparseable timestamp is an error.
    pub fn from_json(json: serde_json::Value) -> Result<Value> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Double(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_json::Value::Object(map) => {
                if map.len() == 1
                    && let Some(raw) = map.get(TIMESTAMP_KEY)
                {
                    let text = raw.as_str().ok_or_else(|| {
                        ChoreSyncError::InvalidInput(format!("{TIMESTAMP_KEY} must be a string"))
                    })?;
                    let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| {
                        ChoreSyncError::InvalidInput(format!("Bad timestamp '{text}': {e}"))
                    })?;
                    return Ok(Value::Timestamp(parsed.with_timezone(&Utc)));
                }
                Value::Map(fields_from_json(map)?)
            }
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::json!(i),
            Value::Double(d) => serde_json::json!(d),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Timestamp(t) => serde_json::json!({ TIMESTAMP_KEY: t.to_rfc3339() }),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(fields) => fields_to_json(fields),
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

/// Convert a JSON object into a field map.
pub fn fields_from_json(map: serde_json::Map<String, serde_json::Value>) -> Result<Fields> {
    map.into_iter()
        .map(|(k, v)| Ok((k, Value::from_json(v)?)))
        .collect()
}

pub fn fields_to_json(fields: &Fields) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// A stored document: identifier plus field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// String field that is present and non-empty.
    pub fn get_non_empty_str(&self, field: &str) -> Option<&str> {
        self.get_str(field).filter(|s| !s.is_empty())
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }
}

/// Path to a collection: `users`, `households/h1/chores`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Parse a collection path. Segments must be non-empty and their count odd.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(ChoreSyncError::InvalidInput(format!(
                "Empty segment in collection path '{path}'"
            )));
        }
        if segments.len() % 2 == 0 {
            return Err(ChoreSyncError::InvalidInput(format!(
                "'{path}' points at a document, not a collection"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Top-level collection.
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Sub-collection under one of this collection's documents.
    pub fn child(&self, doc_id: &str, name: &str) -> Self {
        Self(format!("{}/{}/{}", self.0, doc_id, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Documents missing the field never match.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual.matches_eq(&self.value),
            FilterOp::Gte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// A collection query: all filters must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: CollectionPath,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn new(collection: CollectionPath) -> Self {
        Self {
            collection,
            filters: Vec::new(),
        }
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Eq, value.into())
    }

    pub fn where_gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Gte, value.into())
    }

    pub fn where_lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, FilterOp::Lte, value.into())
    }

    fn push(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}
