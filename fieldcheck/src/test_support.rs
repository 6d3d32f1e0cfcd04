//! Test-only helpers for building rules and file fixtures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::types::RuleDeclaration;
use crate::predicates::Predicate;

/// Unnamed "required" rule: fails on empty values, never skipped.
pub fn required_rule(field: &str) -> RuleDeclaration {
    RuleDeclaration::field(field)
        .method("isEmpty")
        .valid_when(false)
        .skip_if_empty(false)
        .message("Required")
}

/// Predicate comparing two group members; an unset member never matches.
pub fn fields_match(left: &str, right: &str) -> Predicate {
    let (left, right) = (left.to_string(), right.to_string());
    Predicate::new(move |input| {
        matches!(
            (input.group.get(&left), input.group.get(&right)),
            (Some(a), Some(b)) if a == b
        )
    })
}

/// `password` / `confirmPassword` rules sharing `group_id`.
pub fn password_pair(group_id: &str) -> Vec<RuleDeclaration> {
    let same = fields_match("password", "confirmPassword");
    ["password", "confirmPassword"]
        .into_iter()
        .map(|field| {
            RuleDeclaration::field(field)
                .method(same.clone())
                .group(group_id)
                .skip_if_empty(false)
                .message("Passwords must match")
        })
        .collect()
}

/// Temporary directory for rules and state files.
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the fixture and return its path.
    pub fn write(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}
