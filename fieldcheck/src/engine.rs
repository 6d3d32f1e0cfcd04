//! The validation engine.
//!
//! An [`Engine`] owns the merged form state, its resolved rules and the
//! result of the previous pass. Each [`Engine::validate`] call merges a
//! partial state, runs every rule once in registration order and updates
//! the stored result, which becomes the baseline for the next call.
//!
//! Per rule, a pass:
//! - skips fields that have never been set;
//! - skips fields a previous rule already failed in this pass;
//! - coerces numbers to text when configured;
//! - skips empty values for rules with `skip_if_empty`;
//! - collects group context for grouped rules;
//! - records the verdict, and on success clears every other entry tagged
//!   with the same group.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::EngineOptions;
use crate::core::path::FieldPath;
use crate::core::state::FormState;
use crate::core::types::{
    FieldRule, FieldValidationState, RuleDeclaration, RuleTemplate, ValidationResult,
};
use crate::core::value::{coerce_number, is_empty};
use crate::error::Result;
use crate::predicates::{PredicateInput, PredicateLibrary, PredicateSet};
use crate::registry::{self, RuleRegistry};

pub struct Engine {
    options: EngineOptions,
    registry: RuleRegistry,
    state: FormState,
    result: Option<ValidationResult>,
}

impl Engine {
    /// Build an engine over the built-in predicates.
    pub fn new(declarations: Vec<RuleDeclaration>, options: EngineOptions) -> Result<Self> {
        Self::with_predicates(Arc::new(PredicateSet::builtin()), declarations, options)
    }

    /// Build an engine over a caller-supplied predicate library.
    ///
    /// The global templates are copied now; later global changes do not
    /// reach this engine.
    pub fn with_predicates(
        library: Arc<dyn PredicateLibrary>,
        declarations: Vec<RuleDeclaration>,
        options: EngineOptions,
    ) -> Result<Self> {
        options.validate()?;
        let mut engine = Self {
            options,
            registry: RuleRegistry::new(library),
            state: FormState::new(),
            result: None,
        };
        engine.register_field_rules(declarations)?;
        Ok(engine)
    }

    /// Register process-wide templates. See [`registry::register_global_rules`].
    pub fn register_global_rules(templates: Vec<RuleTemplate>) -> Result<()> {
        registry::register_global_rules(templates)
    }

    /// Reset the process-wide templates.
    pub fn clear_global_rules() {
        registry::clear_global_rules();
    }

    /// Register templates visible only to this engine.
    ///
    /// Rules already registered keep the template values they resolved with.
    pub fn register_form_rules(&mut self, templates: Vec<RuleTemplate>) -> Result<&mut Self> {
        self.registry.register_form_rules(templates)?;
        Ok(self)
    }

    pub fn register_field_rules(
        &mut self,
        declarations: Vec<RuleDeclaration>,
    ) -> Result<&mut Self> {
        let added = self.registry.register_field_rules(declarations)?;
        debug!(added, total = self.registry.rules().len(), "registered field rules");
        Ok(self)
    }

    /// Seed a value without running validation.
    pub fn set_field_value(&mut self, path: &str, value: Value) -> Result<&mut Self> {
        let path = FieldPath::parse(path)?;
        self.state = self.state.with_field_value(&path, value);
        Ok(self)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn rules(&self) -> &[FieldRule] {
        self.registry.rules()
    }

    /// Result of the most recent pass, if any.
    pub fn result(&self) -> Option<&ValidationResult> {
        self.result.as_ref()
    }

    /// Merge `partial` into the form state and run one validation pass.
    ///
    /// `partial` must be an object or `null`. Rejected input leaves the
    /// engine untouched.
    pub fn validate(&mut self, partial: Value) -> Result<ValidationResult> {
        self.state = self.state.merge(&partial)?;

        // The stored result must survive a panicking predicate.
        let mut result = self
            .result
            .clone()
            .unwrap_or_else(|| ValidationResult::baseline(std::iter::empty()));
        result.ensure_fields(self.registry.fields());

        let pass = Pass {
            options: &self.options,
            state: &self.state,
            rules: self.registry.rules(),
        };
        let mut invalidated = HashSet::new();
        for rule in pass.rules {
            pass.apply(rule, &mut result, &mut invalidated);
        }
        result.recompute_validity();

        debug!(
            is_valid = result.is_valid,
            invalid = invalidated.len(),
            "validation pass complete"
        );
        self.result = Some(result.clone());
        Ok(result)
    }
}

/// Borrowed view of the engine for one pass.
struct Pass<'a> {
    options: &'a EngineOptions,
    state: &'a FormState,
    rules: &'a [FieldRule],
}

impl Pass<'_> {
    fn apply(
        &self,
        rule: &FieldRule,
        result: &mut ValidationResult,
        invalidated: &mut HashSet<String>,
    ) {
        let field = rule.field.as_str();
        let Some(raw) = self.state.get(&rule.field) else {
            trace!(field, "field never set; skipping rule");
            return;
        };
        if invalidated.contains(field) {
            trace!(field, "field already failed this pass; skipping rule");
            return;
        }

        let value = self.coerce(raw);
        if rule.skip_if_empty && is_empty(&value) {
            trace!(field, "empty value; skipping rule");
            return;
        }

        let group = match rule.group_id.as_deref() {
            Some(group_id) => self.group_context(group_id),
            None => Map::new(),
        };
        let outcome = rule.predicate.call(&PredicateInput {
            value: &value,
            args: &rule.args,
            state: self.state.as_value(),
            group: &group,
        });
        trace!(field, method = rule.method.label(), outcome, "evaluated rule");

        if outcome != rule.valid_when {
            let message = rule
                .message
                .clone()
                .unwrap_or_else(|| self.options.default_message.clone());
            result.fields.insert(
                field.to_string(),
                FieldValidationState {
                    is_invalid: true,
                    message,
                    group_id: rule.group_id.clone(),
                },
            );
            invalidated.insert(field.to_string());
            return;
        }

        result.fields.insert(
            field.to_string(),
            FieldValidationState {
                is_invalid: false,
                message: String::new(),
                group_id: rule.group_id.clone(),
            },
        );
        if let Some(group_id) = rule.group_id.as_deref() {
            reconcile_group(result, field, group_id);
        }
    }

    fn coerce<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        if self.options.convert_number_to_string {
            coerce_number(value)
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Current values of every field with a rule in `group_id`, keyed by
    /// final path segment. Unset fields are left out.
    fn group_context(&self, group_id: &str) -> Map<String, Value> {
        let mut group = Map::new();
        for member in self
            .rules
            .iter()
            .filter(|rule| rule.group_id.as_deref() == Some(group_id))
        {
            if let Some(value) = self.state.get(&member.field) {
                group.insert(member.field.last_segment(), self.coerce(value).into_owned());
            }
        }
        group
    }
}

/// Clear the failures of the other members of a group once one member passes.
fn reconcile_group(result: &mut ValidationResult, field: &str, group_id: &str) {
    for (path, state) in &mut result.fields {
        if path != field && state.is_invalid && state.group_id.as_deref() == Some(group_id) {
            debug!(field = %path, group = group_id, "clearing group member");
            state.is_invalid = false;
            state.message.clear();
        }
    }
}
