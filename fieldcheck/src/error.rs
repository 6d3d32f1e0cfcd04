//! Error types for rule registration and engine setup.
//!
//! Every variant is a configuration problem. A predicate that returns
//! `false` is not an error; it shows up as an invalid entry in the
//! [`ValidationResult`](crate::core::types::ValidationResult).

use thiserror::Error;

/// Result type for fieldcheck operations.
pub type Result<T> = std::result::Result<T, FieldcheckError>;

#[derive(Debug, Error)]
pub enum FieldcheckError {
    /// A global or form template was registered without a name.
    #[error("rule template at position {index} has no name")]
    MissingTemplateName { index: usize },

    /// A field declaration carried neither `field` nor `name`.
    #[error("rule declaration at position {index} has neither a field nor a name")]
    MissingFieldAndName { index: usize },

    /// The resolved rule has no predicate to run.
    #[error("rule on field '{field}' has no method and no template supplies one")]
    MissingMethod { field: String },

    /// A declaration named a template that is not registered and supplied no method.
    #[error("rule on field '{field}' references unknown template '{name}'")]
    UnknownTemplate { field: String, name: String },

    /// The predicate library has no entry for a named method.
    #[error("rule on field '{field}' references unknown method '{method}'")]
    UnknownMethod { field: String, method: String },

    /// A field path could not be parsed.
    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A partial state was not a JSON object.
    #[error("partial state must be an object, got {kind}")]
    InvalidState { kind: &'static str },

    /// A `matches` rule carried a pattern that does not compile.
    #[error("rule on field '{field}' has invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rule arguments do not fit the method.
    #[error("rule on field '{field}' has invalid args for '{method}': {reason}")]
    InvalidArgs {
        field: String,
        method: String,
        reason: String,
    },

    /// Engine options failed validation.
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),
}
