//! Partial form states stored as JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::debug;

/// Load one partial state. The file must hold a JSON object.
pub fn load_state(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "loading partial state");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read state {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse state {}", path.display()))?;
    if !value.is_object() {
        return Err(anyhow!("state {} must hold a JSON object", path.display()));
    }
    Ok(value)
}
