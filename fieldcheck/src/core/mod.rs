//! Deterministic, pure logic shared by the engine.
//!
//! Core modules are free of I/O. They operate on in-memory JSON values and
//! return deterministic outputs suitable for tests.

pub mod path;
pub mod state;
pub mod types;
pub mod value;
