//! Row identity and shallow-merge patching.
//!
//! The controller treats rows as opaque. The [`Row`] trait is only needed
//! by collaborators that key on identity, such as
//! [`crate::service::SelectionSet`].

use std::hash::Hash;

use serde_json::{Map, Value};

/// A list row carrying a stable unique identifier.
pub trait Row {
    /// Identifier type (commonly the backend's `id` column).
    type Id: Clone + Eq + Hash + Send + Sync + 'static;

    /// Returns the row's identifier, or `None` if the row has none.
    fn row_id(&self) -> Option<Self::Id>;
}

/// Identifier extracted from a JSON row's `id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonId {
    /// Integer identifier.
    Int(i64),
    /// String identifier (UUIDs, slugs).
    Str(String),
}

impl From<i64> for JsonId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for JsonId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl Row for Value {
    type Id = JsonId;

    fn row_id(&self) -> Option<JsonId> {
        match self.get("id")? {
            Value::Number(n) => n.as_i64().map(JsonId::Int),
            Value::String(s) => Some(JsonId::Str(s.clone())),
            _ => None,
        }
    }
}

/// Shallow-merges `patch` into a JSON object row.
///
/// Top-level keys in `patch` replace the row's keys; nested objects are
/// replaced whole, not merged. Non-object rows are left untouched.
pub fn merge_shallow(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(fields) = row {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
}
