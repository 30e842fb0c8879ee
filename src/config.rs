use serde::{Deserialize, Serialize};

use crate::diagnostics::ValidationError;

/// How strictly non-void functions must end in a `return`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnCoverage {
    /// Every path through the body must return, tracking break targets.
    #[default]
    Precise,
    /// Some `return` must exist; fall-through paths are not examined.
    Presence,
}

/// Validator settings. Every field has a default, so an empty TOML
/// document is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Longest uncoerced chain of integer `+`/`-` operands.
    pub max_additive_operands: usize,
    pub return_coverage: ReturnCoverage,
}

pub const DEFAULT_MAX_ADDITIVE_OPERANDS: usize = 1 << 20;

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_additive_operands: DEFAULT_MAX_ADDITIVE_OPERANDS,
            return_coverage: ReturnCoverage::Precise,
        }
    }
}

impl ValidatorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ValidationError> {
        let config: ValidatorConfig = toml::from_str(content)
            .map_err(|e| ValidationError::config(format!("invalid syntax: {e}")))?;
        if config.max_additive_operands < 2 {
            return Err(ValidationError::config(
                "max_additive_operands must be at least 2",
            ));
        }
        Ok(config)
    }
}
