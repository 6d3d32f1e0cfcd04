//! Stable exit codes for the `fieldcheck` binary.

/// Command succeeded; for `check`, the final result is valid.
pub const OK: i32 = 0;
/// Command failed on unreadable input or a configuration error.
pub const ERROR: i32 = 1;
/// `fieldcheck check` finished and at least one field is invalid.
pub const INVALID: i32 = 2;
