//! Rule templates and the ordered list of resolved field rules.
//!
//! Templates live in two scopes:
//!
//! - **Global**: process-wide, written by [`register_global_rules`] and reset
//!   by [`clear_global_rules`]. Writers are expected to run before any
//!   engine starts validating.
//! - **Form**: per registry instance, shadowing global templates of the
//!   same name.
//!
//! A [`RuleRegistry`] copies the global scope when it is created, so later
//! global changes never reach an existing engine.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::core::path::FieldPath;
use crate::core::types::{FieldRule, Method, RuleDeclaration, RuleTemplate};
use crate::error::{FieldcheckError, Result};
use crate::predicates::{Predicate, PredicateLibrary, pattern_predicate};

static GLOBAL_TEMPLATES: LazyLock<RwLock<HashMap<String, RuleTemplate>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register templates in the process-wide scope.
///
/// Every template must carry a non-empty name; if any does not, nothing is
/// registered. A template replaces any earlier one of the same name.
pub fn register_global_rules(templates: Vec<RuleTemplate>) -> Result<()> {
    check_template_names(&templates)?;
    let mut global = GLOBAL_TEMPLATES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    for template in templates {
        debug!(template = %template.name, "registering global rule template");
        global.insert(template.name.clone(), template);
    }
    Ok(())
}

/// Remove every global template.
pub fn clear_global_rules() {
    GLOBAL_TEMPLATES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
    debug!("cleared global rule templates");
}

/// Copy of the global scope as it stands now.
pub fn global_rules_snapshot() -> HashMap<String, RuleTemplate> {
    GLOBAL_TEMPLATES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn check_template_names(templates: &[RuleTemplate]) -> Result<()> {
    match templates
        .iter()
        .position(|template| template.name.trim().is_empty())
    {
        Some(index) => Err(FieldcheckError::MissingTemplateName { index }),
        None => Ok(()),
    }
}

/// Templates and field rules owned by one engine.
pub struct RuleRegistry {
    global: HashMap<String, RuleTemplate>,
    form: HashMap<String, RuleTemplate>,
    rules: Vec<FieldRule>,
    library: Arc<dyn PredicateLibrary>,
}

impl RuleRegistry {
    /// Create a registry over `library`, snapshotting the global templates.
    pub fn new(library: Arc<dyn PredicateLibrary>) -> Self {
        Self {
            global: global_rules_snapshot(),
            form: HashMap::new(),
            rules: Vec::new(),
            library,
        }
    }

    /// Register instance-scoped templates. Same contract as the global scope.
    pub fn register_form_rules(&mut self, templates: Vec<RuleTemplate>) -> Result<()> {
        check_template_names(&templates)?;
        for template in templates {
            debug!(template = %template.name, "registering form rule template");
            self.form.insert(template.name.clone(), template);
        }
        Ok(())
    }

    /// Look a template up, form scope first.
    pub fn template(&self, name: &str) -> Option<&RuleTemplate> {
        self.form.get(name).or_else(|| self.global.get(name))
    }

    /// Resolve and append field rules in order.
    ///
    /// A named declaration whose `(field, name)` pair is already registered
    /// is skipped. Unnamed declarations are always appended. Nothing is
    /// appended when any declaration fails to resolve.
    ///
    /// Returns the number of rules appended.
    pub fn register_field_rules(&mut self, declarations: Vec<RuleDeclaration>) -> Result<usize> {
        let mut staged: Vec<FieldRule> = Vec::new();
        for (index, declaration) in declarations.into_iter().enumerate() {
            let rule = self.resolve(index, declaration)?;
            if let Some(name) = rule.name.as_deref() {
                let field = rule.field.as_str();
                if self
                    .rules
                    .iter()
                    .chain(staged.iter())
                    .any(|existing| is_same_named_rule(existing, field, name))
                {
                    debug!(field, template = name, "skipping duplicate named rule");
                    continue;
                }
            }
            trace!(field = %rule.field, method = rule.method.label(), "resolved field rule");
            staged.push(rule);
        }
        let added = staged.len();
        self.rules.extend(staged);
        Ok(added)
    }

    /// Merge a declaration with its template into a [`FieldRule`].
    ///
    /// Template values win for `method`, `args`, `valid_when` and
    /// `skip_if_empty`; a declared `message` wins over the template's.
    pub fn resolve(&self, index: usize, declaration: RuleDeclaration) -> Result<FieldRule> {
        let RuleDeclaration {
            field,
            name,
            group_id,
            method,
            args,
            valid_when,
            skip_if_empty,
            message,
        } = declaration;

        let raw_field = field
            .or_else(|| name.clone())
            .ok_or(FieldcheckError::MissingFieldAndName { index })?;
        let field = FieldPath::parse(&raw_field)?;

        let template = name.as_deref().and_then(|name| self.template(name));
        if let (Some(name), None, None) = (name.as_deref(), template, method.as_ref()) {
            return Err(FieldcheckError::UnknownTemplate {
                field: raw_field,
                name: name.to_string(),
            });
        }

        let method = template
            .and_then(|t| t.method.clone())
            .or(method)
            .ok_or_else(|| FieldcheckError::MissingMethod {
                field: raw_field.clone(),
            })?;
        let args = template
            .and_then(|t| t.args.clone())
            .or(args)
            .unwrap_or_default();
        let valid_when = template
            .and_then(|t| t.valid_when)
            .or(valid_when)
            .unwrap_or(true);
        let skip_if_empty = template
            .and_then(|t| t.skip_if_empty)
            .or(skip_if_empty)
            .unwrap_or(true);
        let message = message.or_else(|| template.and_then(|t| t.message.clone()));

        let mut predicate = self.resolve_method(&field, &method)?;
        if let Some(compiled) = compile_match_pattern(&field, &method, &args)? {
            predicate = compiled;
        }

        Ok(FieldRule {
            field,
            name,
            group_id,
            method,
            predicate,
            args,
            valid_when,
            skip_if_empty,
            message,
        })
    }

    /// Direct predicates are used as-is; names go through the library.
    pub fn resolve_method(&self, field: &FieldPath, method: &Method) -> Result<Predicate> {
        match method {
            Method::Direct(predicate) => Ok(predicate.clone()),
            Method::Named(name) => {
                self.library
                    .lookup(name)
                    .ok_or_else(|| FieldcheckError::UnknownMethod {
                        field: field.to_string(),
                        method: name.clone(),
                    })
            }
        }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Distinct field paths in first-registration order.
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            let field = rule.field.as_str();
            if !seen.contains(&field) {
                seen.push(field);
            }
        }
        seen
    }
}

fn is_same_named_rule(rule: &FieldRule, field: &str, name: &str) -> bool {
    rule.field.as_str() == field && rule.name.as_deref() == Some(name)
}

/// Compile the pattern of a `matches` rule once, at registration.
///
/// Returns `None` for every other method.
fn compile_match_pattern(
    field: &FieldPath,
    method: &Method,
    args: &[Value],
) -> Result<Option<Predicate>> {
    if !matches!(method, Method::Named(name) if name == "matches") {
        return Ok(None);
    }
    match args.first() {
        Some(Value::String(pattern)) => pattern_predicate(pattern, args.get(1))
            .map(Some)
            .map_err(|source| FieldcheckError::InvalidPattern {
                field: field.to_string(),
                pattern: pattern.clone(),
                source,
            }),
        _ => Err(FieldcheckError::InvalidArgs {
            field: field.to_string(),
            method: "matches".to_string(),
            reason: "first argument must be a pattern string".to_string(),
        }),
    }
}
