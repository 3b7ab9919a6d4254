//! Domain layer - Core business logic and entities

pub mod error;
pub mod prompt;
pub mod storage;

pub use error::{DomainError, PersistenceError};
pub use prompt::{
    validate_prompt, NewPrompt, Prompt, PromptFilter, PromptId, PromptInfo, PromptPatch,
    PromptStatus, PromptValidationError, QueryPromptNotes, Score, SearchField,
};
pub use storage::BlobStore;
