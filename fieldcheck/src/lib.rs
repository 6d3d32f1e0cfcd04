//! Incremental, rule-based validation of form state.
//!
//! A form is validated in passes. Each pass merges a partial update into the
//! accumulated state and runs every registered field rule once, producing a
//! per-field verdict that persists into the next pass. Rules can come from
//! reusable named templates and can be grouped into cross-field constraints
//! whose members clear together once the constraint holds.
//!
//! - **[`core`]**: Pure logic (paths, state merging, rule and result types).
//! - **[`predicates`]**: Predicate values and the named predicate library.
//! - **[`registry`]**: Global and per-engine templates; rule resolution.
//! - **[`declaration`]**: Shorthand rule shapes flattened into declarations.
//! - **[`engine`]**: The validation pass.
//! - **[`io`]**: Rules and state files for the `fieldcheck` binary.

pub mod config;
pub mod core;
pub mod declaration;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod predicates;
pub mod registry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::config::EngineOptions;
pub use crate::core::types::{
    FieldRule, FieldValidationState, Method, RuleDeclaration, RuleTemplate, ValidationResult,
};
pub use crate::declaration::RuleInput;
pub use crate::engine::Engine;
pub use crate::error::{FieldcheckError, Result};
pub use crate::predicates::{Predicate, PredicateInput, PredicateLibrary, PredicateSet};
