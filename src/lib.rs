//! Prompt Registry
//!
//! A small versioned collection of prompt templates keyed by (datapoint, clause):
//! - Creating a prompt for an existing key bumps the version and supersedes the prior record
//! - Records are queried by id, datapoint, clause and status
//! - The whole collection is mirrored to blob storage after every change

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;
pub use domain::{
    DomainError, NewPrompt, PersistenceError, Prompt, PromptFilter, PromptId, PromptInfo,
    PromptPatch, PromptStatus, QueryPromptNotes,
};
pub use infrastructure::prompt::PromptRepository;
pub use infrastructure::storage::{BlobStoreFactory, SnapshotStore};
