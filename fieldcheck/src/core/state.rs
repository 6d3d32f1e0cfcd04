//! Accumulated form state across partial updates.

use serde_json::{Map, Value};

use crate::core::path::{self, FieldPath};
use crate::error::{FieldcheckError, Result};

/// Cumulative form state. Each merge yields a new snapshot; values at paths
/// a fragment does not mention are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    root: Value,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Read the value at `path` from the current snapshot.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        path::get(&self.root, path)
    }

    /// Merge a partial fragment and return the resulting snapshot.
    ///
    /// Objects merge key by key; any other value replaces what was stored at
    /// its path. `null` as the whole fragment is an empty update.
    pub fn merge(&self, partial: &Value) -> Result<FormState> {
        let fragment = match partial {
            Value::Object(map) => map,
            Value::Null => return Ok(self.clone()),
            other => {
                return Err(FieldcheckError::InvalidState {
                    kind: value_kind(other),
                });
            }
        };

        let mut root = match &self.root {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        merge_into(&mut root, fragment);
        Ok(FormState {
            root: Value::Object(root),
        })
    }

    /// Return the snapshot with a single path set.
    pub fn with_field_value(&self, path: &FieldPath, value: Value) -> FormState {
        FormState {
            root: path::set(self.as_object_root(), path, value),
        }
    }

    fn as_object_root(&self) -> Value {
        match &self.root {
            Value::Object(_) => self.root.clone(),
            _ => Value::Object(Map::new()),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_into(target: &mut Map<String, Value>, fragment: &Map<String, Value>) {
    for (key, incoming) in fragment {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_into(existing, nested),
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
