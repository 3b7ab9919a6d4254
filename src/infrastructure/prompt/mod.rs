//! Prompt infrastructure - the owned prompt collection

mod repository;

pub use repository::PromptRepository;
