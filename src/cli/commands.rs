//! Subcommand execution

use serde::Serialize;
use tracing::warn;

use super::{Command, ListArgs};
use crate::config::AppConfig;
use crate::domain::{NewPrompt, PromptFilter, PromptPatch, PromptStatus};
use crate::infrastructure::logging;
use crate::infrastructure::prompt::PromptRepository;

/// Run one subcommand against the configured repository
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    let mut repository = PromptRepository::from_config(&config).await?;

    match command {
        Command::Create { fields } => {
            let input = NewPrompt::from_json(serde_json::from_str(&fields)?)?;
            let prompt = repository.create(input).await?;
            print_json(&prompt)
        }
        Command::Update { id, fields } => {
            let patch = PromptPatch::from_json(serde_json::from_str(&fields)?)?;
            let prompt = repository.update(&id, patch).await?;
            print_json(&prompt)
        }
        Command::List(args) => {
            let filter = list_filter(args)?;
            print_json(&repository.query(&filter))
        }
        Command::Notes { datapoint } => {
            print_json(&repository.get_query_prompts_and_notes(&datapoint))
        }
        Command::Info { term, field } => print_json(&repository.get_prompts_info(&term, &field)),
    }
}

fn list_filter(args: ListArgs) -> anyhow::Result<PromptFilter> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<PromptStatus>)
        .transpose()?;

    Ok(PromptFilter {
        id: args.id,
        datapoint: args.datapoint,
        clause: args.clause,
        status,
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter_parses_status() {
        let filter = list_filter(ListArgs {
            clause: Some("Rent".to_string()),
            status: Some("superseded".to_string()),
            ..ListArgs::default()
        })
        .unwrap();

        assert_eq!(
            filter,
            PromptFilter::new()
                .with_clause("Rent")
                .with_status(PromptStatus::Superseded)
        );
    }

    #[test]
    fn test_list_filter_rejects_unknown_status() {
        let result = list_filter(ListArgs {
            status: Some("retired".to_string()),
            ..ListArgs::default()
        });

        assert!(result.is_err());
    }
}
