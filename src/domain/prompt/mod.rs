//! Prompt domain - versioned prompt templates keyed by (datapoint, clause)

mod entity;
mod query;
mod validation;

pub use entity::{NewPrompt, Prompt, PromptId, PromptPatch, PromptStatus, Score};
pub use query::{PromptFilter, PromptInfo, QueryPromptNotes, SearchField};
pub use validation::{validate_prompt, PromptValidationError};
