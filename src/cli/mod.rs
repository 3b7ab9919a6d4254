//! CLI module for the prompt registry
//!
//! Each subcommand opens the repository from configuration, runs one
//! operation and prints the result as JSON on stdout.

mod commands;

pub use commands::run;

use clap::{Args, Parser, Subcommand};

/// Prompt Registry - versioned prompt templates mirrored to object storage
#[derive(Parser)]
#[command(name = "prompt-registry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a prompt from a JSON field map, superseding its lineage
    Create {
        /// e.g. '{"datapoint": "What is the Rent?", "clause": "Rent", "created_by": "A", "query_prompt": "..."}'
        fields: String,
    },

    /// Overwrite fields of an existing prompt
    Update {
        id: String,
        /// JSON field map, e.g. '{"notes": "final"}'
        fields: String,
    },

    /// List prompts matching all given filters
    List(ListArgs),

    /// Show query prompts and notes for a datapoint
    Notes { datapoint: String },

    /// Show id, query prompt, notes and version of prompts matching a field
    Info {
        term: String,
        /// One of: id, datapoint, clause
        field: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub datapoint: Option<String>,

    #[arg(long)]
    pub clause: Option<String>,

    /// latest or superseded
    #[arg(long)]
    pub status: Option<String>,
}
