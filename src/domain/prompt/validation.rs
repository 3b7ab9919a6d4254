//! Prompt validation

use thiserror::Error;
use validator::{Validate, ValidationErrors};

use super::Prompt;
use crate::domain::DomainError;

/// Reasons a prompt is refused admission to the collection
#[derive(Debug, Error)]
pub enum PromptValidationError {
    #[error("Prompt ID cannot be empty")]
    EmptyId,

    #[error("Invalid prompt fields: {0}")]
    Fields(#[from] ValidationErrors),

    #[error("Malformed prompt fields: {0}")]
    Malformed(String),

    #[error("Cannot create a version after {previous_version}: version limit reached")]
    VersionOverflow { previous_version: u32 },
}

impl From<PromptValidationError> for DomainError {
    fn from(error: PromptValidationError) -> Self {
        DomainError::validation(error.to_string())
    }
}

/// Check a prompt against the record schema.
///
/// Every path that produces a `Prompt` (creation, patching, snapshot decoding)
/// runs through here before the value is handed out.
pub fn validate_prompt(prompt: &Prompt) -> Result<(), PromptValidationError> {
    if prompt.id().as_str().trim().is_empty() {
        return Err(PromptValidationError::EmptyId);
    }

    prompt.validate()?;
    Ok(())
}
