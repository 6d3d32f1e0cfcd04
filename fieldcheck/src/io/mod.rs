//! File loading for the `fieldcheck` binary.

pub mod rules_file;
pub mod state_file;
