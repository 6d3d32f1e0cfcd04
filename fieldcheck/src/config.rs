//! Engine options.

use serde::{Deserialize, Serialize};

use crate::error::{FieldcheckError, Result};

/// Options fixed when an engine is built.
///
/// Missing fields default, so a rules file may omit the `[options]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    /// Evaluate numeric values as their string form.
    pub convert_number_to_string: bool,

    /// Message for failing rules that declare none.
    pub default_message: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            convert_number_to_string: true,
            default_message: "Invalid".to_string(),
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        if self.default_message.trim().is_empty() {
            return Err(FieldcheckError::InvalidOptions(
                "default_message must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
