//! Impact level vocabulary and the creation-time description invariant.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum trimmed description length required when impact is `alto`.
pub const MIN_ALTO_DESCRIPTION_LEN: usize = 20;

/// Severity tag driving SLA thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Baixo,
    Medio,
    Alto,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Baixo => "baixo",
            Impact::Medio => "medio",
            Impact::Alto => "alto",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "baixo" => Ok(Impact::Baixo),
            "medio" => Ok(Impact::Medio),
            "alto" => Ok(Impact::Alto),
            other => Err(CoreError::Validation(format!(
                "Invalid impact '{other}'. Must be one of: baixo, medio, alto"
            ))),
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a ticket description against its impact level.
///
/// High-impact tickets must arrive with enough detail to be actionable:
/// impact `alto` requires a trimmed description of at least
/// [`MIN_ALTO_DESCRIPTION_LEN`] characters.
pub fn validate_description(impact: Impact, description: &str) -> Result<(), CoreError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Description must not be empty".to_string(),
        ));
    }
    if impact == Impact::Alto && trimmed.chars().count() < MIN_ALTO_DESCRIPTION_LEN {
        return Err(CoreError::Validation(format!(
            "Impact 'alto' requires a description of at least \
             {MIN_ALTO_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}
