//! Rule and result types shared across the crate.
//!
//! Templates and declarations are what callers hand in; [`FieldRule`] is the
//! resolved form the engine evaluates; [`ValidationResult`] is what comes out.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::path::FieldPath;
use crate::predicates::Predicate;

/// How a rule names its predicate.
#[derive(Debug, Clone)]
pub enum Method {
    /// Looked up in the predicate library.
    Named(String),
    /// Supplied directly by the caller.
    Direct(Predicate),
}

impl Method {
    pub fn label(&self) -> &str {
        match self {
            Method::Named(name) => name,
            Method::Direct(_) => "<function>",
        }
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        Method::Named(name.to_string())
    }
}

impl From<String> for Method {
    fn from(name: String) -> Self {
        Method::Named(name)
    }
}

impl From<Predicate> for Method {
    fn from(predicate: Predicate) -> Self {
        Method::Direct(predicate)
    }
}

/// Rules files can only name methods.
impl<'de> Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Method::Named)
    }
}

/// A named, reusable rule definition not yet bound to a field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: Option<Method>,
    #[serde(default)]
    pub args: Option<Vec<Value>>,
    #[serde(default)]
    pub valid_when: Option<bool>,
    #[serde(default)]
    pub skip_if_empty: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RuleTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: impl Into<Method>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn valid_when(mut self, valid_when: bool) -> Self {
        self.valid_when = Some(valid_when);
        self
    }

    pub fn skip_if_empty(mut self, skip_if_empty: bool) -> Self {
        self.skip_if_empty = Some(skip_if_empty);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A caller-supplied rule for a field, possibly referring to a template.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleDeclaration {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub method: Option<Method>,
    #[serde(default)]
    pub args: Option<Vec<Value>>,
    #[serde(default)]
    pub valid_when: Option<bool>,
    #[serde(default)]
    pub skip_if_empty: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RuleDeclaration {
    /// Declaration bound to `field` with nothing else set.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// Shorthand for `field` plus a template name.
    pub fn named(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::field(field).name(name)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn method(mut self, method: impl Into<Method>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn valid_when(mut self, valid_when: bool) -> Self {
        self.valid_when = Some(valid_when);
        self
    }

    pub fn skip_if_empty(mut self, skip_if_empty: bool) -> Self {
        self.skip_if_empty = Some(skip_if_empty);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A resolved rule bound to one field path.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: FieldPath,
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub method: Method,
    pub predicate: Predicate,
    pub args: Vec<Value>,
    pub valid_when: bool,
    pub skip_if_empty: bool,
    pub message: Option<String>,
}

/// Verdict for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationState {
    pub is_invalid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl FieldValidationState {
    pub fn valid() -> Self {
        Self::default()
    }
}

/// Per-field verdicts plus the aggregate flag.
///
/// Entries are keyed by field path in lexicographic order so serialized
/// output is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub fields: BTreeMap<String, FieldValidationState>,
}

impl ValidationResult {
    /// All-valid result with one entry per given field.
    pub fn baseline<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut result = Self {
            is_valid: true,
            fields: BTreeMap::new(),
        };
        result.ensure_fields(fields);
        result
    }

    /// Add a valid entry for every field that has none yet.
    pub fn ensure_fields<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        for field in fields {
            self.fields
                .entry(field.to_string())
                .or_insert_with(FieldValidationState::valid);
        }
    }

    pub fn field(&self, path: &str) -> Option<&FieldValidationState> {
        self.fields.get(path)
    }

    /// True when the field has an entry marked invalid.
    pub fn is_field_invalid(&self, path: &str) -> bool {
        self.field(path).is_some_and(|state| state.is_invalid)
    }

    /// Fields currently marked invalid, in key order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, state)| state.is_invalid)
            .map(|(path, _)| path.as_str())
            .collect()
    }

    pub(crate) fn recompute_validity(&mut self) {
        self.is_valid = self.fields.values().all(|state| !state.is_invalid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn baseline_is_valid_with_every_field_present() {
        let result = ValidationResult::baseline(["username", "company.name"]);
        assert!(result.is_valid);
        assert_eq!(result.field("username"), Some(&FieldValidationState::valid()));
        assert_eq!(
            result.field("company.name"),
            Some(&FieldValidationState::valid())
        );
    }

    #[test]
    fn recompute_validity_tracks_invalid_entries() {
        let mut result = ValidationResult::baseline(["a", "b"]);
        result.fields.get_mut("b").expect("b").is_invalid = true;
        result.recompute_validity();
        assert!(!result.is_valid);
        assert_eq!(result.invalid_fields(), vec!["b"]);
    }

    #[test]
    fn field_state_serializes_without_empty_group() {
        let value = serde_json::to_value(FieldValidationState::valid()).expect("serialize");
        assert_eq!(value, json!({"is_invalid": false, "message": ""}));
    }

    #[test]
    fn declaration_deserializes_method_names() {
        let decl: RuleDeclaration = serde_json::from_value(json!({
            "field": "username",
            "method": "isEmpty",
            "valid_when": false
        }))
        .expect("deserialize");
        assert!(matches!(decl.method, Some(Method::Named(ref m)) if m == "isEmpty"));
        assert_eq!(decl.valid_when, Some(false));
    }
}
