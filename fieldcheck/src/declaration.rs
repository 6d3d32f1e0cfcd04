//! Normalization of the shorthand rule shapes into [`RuleDeclaration`]s.
//!
//! Callers can describe a field's rules as a template name, a predicate, a
//! full declaration, or a list mixing those. The engine only ever sees
//! declarations, so the shorthand is flattened here first.

use serde::{Deserialize, Deserializer};

use crate::core::types::RuleDeclaration;
use crate::predicates::Predicate;

/// Any accepted way of describing the rules of one field.
#[derive(Debug, Clone)]
pub enum RuleInput {
    /// A template name, e.g. `"required"`.
    Name(String),
    /// Several rules, evaluated in list order.
    Many(Vec<RuleInput>),
    /// A full declaration; its `field` is filled in when missing.
    Declaration(Box<RuleDeclaration>),
    /// An inline predicate with default settings.
    Function(Predicate),
}

/// The shapes a rules file can spell; predicates only exist in code.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRuleInput {
    Name(String),
    Many(Vec<RawRuleInput>),
    Declaration(Box<RuleDeclaration>),
}

impl From<RawRuleInput> for RuleInput {
    fn from(raw: RawRuleInput) -> Self {
        match raw {
            RawRuleInput::Name(name) => RuleInput::Name(name),
            RawRuleInput::Many(items) => {
                RuleInput::Many(items.into_iter().map(Into::into).collect())
            }
            RawRuleInput::Declaration(decl) => RuleInput::Declaration(decl),
        }
    }
}

impl<'de> Deserialize<'de> for RuleInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawRuleInput::deserialize(deserializer).map(Into::into)
    }
}

impl RuleInput {
    /// Flatten into declarations bound to `field`, preserving order.
    pub fn into_declarations(self, field: &str) -> Vec<RuleDeclaration> {
        let mut out = Vec::new();
        self.flatten_into(field, &mut out);
        out
    }

    fn flatten_into(self, field: &str, out: &mut Vec<RuleDeclaration>) {
        match self {
            RuleInput::Name(name) => out.push(RuleDeclaration::named(field, name)),
            RuleInput::Function(predicate) => {
                out.push(RuleDeclaration::field(field).method(predicate));
            }
            RuleInput::Declaration(mut decl) => {
                if decl.field.is_none() {
                    decl.field = Some(field.to_string());
                }
                out.push(*decl);
            }
            RuleInput::Many(inputs) => {
                for input in inputs {
                    input.flatten_into(field, out);
                }
            }
        }
    }
}

impl From<&str> for RuleInput {
    fn from(name: &str) -> Self {
        RuleInput::Name(name.to_string())
    }
}

impl From<Predicate> for RuleInput {
    fn from(predicate: Predicate) -> Self {
        RuleInput::Function(predicate)
    }
}

impl From<RuleDeclaration> for RuleInput {
    fn from(decl: RuleDeclaration) -> Self {
        RuleInput::Declaration(Box::new(decl))
    }
}

impl<T: Into<RuleInput>> From<Vec<T>> for RuleInput {
    fn from(inputs: Vec<T>) -> Self {
        RuleInput::Many(inputs.into_iter().map(Into::into).collect())
    }
}

/// Flatten `(field, input)` pairs in order.
pub fn normalize<I, F, R>(entries: I) -> Vec<RuleDeclaration>
where
    I: IntoIterator<Item = (F, R)>,
    F: AsRef<str>,
    R: Into<RuleInput>,
{
    entries
        .into_iter()
        .flat_map(|(field, input)| input.into().into_declarations(field.as_ref()))
        .collect()
}
