//! Rules files (TOML) describing options, templates and field rules.
//!
//! ```toml
//! [options]
//! default_message = "Invalid"
//!
//! [[templates]]
//! name = "required"
//! method = "isEmpty"
//! valid_when = false
//! skip_if_empty = false
//! message = "Required"
//!
//! [[fields]]
//! field = "email"
//! rules = ["required", { method = "isEmail", message = "Not an email" }]
//! ```
//!
//! Field entries are registered in file order. `rules` accepts a template
//! name, a rule table, or an array of either.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::EngineOptions;
use crate::core::types::{RuleDeclaration, RuleTemplate};
use crate::declaration::RuleInput;
use crate::engine::Engine;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesFile {
    pub options: EngineOptions,
    /// Registered as form templates on the engine built from this file.
    pub templates: Vec<RuleTemplate>,
    pub fields: Vec<FieldEntry>,
}

/// The rules of one field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEntry {
    pub field: String,
    pub rules: RuleInput,
}

impl RulesFile {
    /// Flatten every field entry into declarations, in file order.
    pub fn declarations(&self) -> Vec<RuleDeclaration> {
        self.fields
            .iter()
            .flat_map(|entry| entry.rules.clone().into_declarations(&entry.field))
            .collect()
    }

    /// Build an engine: options first, then templates, then field rules.
    pub fn build_engine(self) -> crate::error::Result<Engine> {
        let declarations = self.declarations();
        let mut engine = Engine::new(Vec::new(), self.options)?;
        engine
            .register_form_rules(self.templates)?
            .register_field_rules(declarations)?;
        Ok(engine)
    }
}

/// Load a rules file. A missing file is an error.
pub fn load_rules_file(path: &Path) -> Result<RulesFile> {
    debug!(path = %path.display(), "loading rules file");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read rules {}", path.display()))?;
    let rules: RulesFile =
        toml::from_str(&contents).with_context(|| format!("parse rules {}", path.display()))?;
    rules
        .options
        .validate()
        .with_context(|| format!("validate options in {}", path.display()))?;
    debug!(
        templates = rules.templates.len(),
        fields = rules.fields.len(),
        "rules file loaded"
    );
    Ok(rules)
}
