//! Prompt lookup filters and read projections

use std::str::FromStr;

use serde::Serialize;

use super::{Prompt, PromptStatus};
use crate::domain::DomainError;

/// Conjunction of optional equality filters over the collection.
///
/// An empty string counts as "not supplied", so `with_id("")` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptFilter {
    pub id: Option<String>,
    pub datapoint: Option<String>,
    pub clause: Option<String>,
    pub status: Option<PromptStatus>,
}

impl PromptFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_datapoint(mut self, datapoint: impl Into<String>) -> Self {
        self.datapoint = Some(datapoint.into());
        self
    }

    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clause = Some(clause.into());
        self
    }

    pub fn with_status(mut self, status: PromptStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        fn field_matches(filter: &Option<String>, value: &str) -> bool {
            match filter.as_deref() {
                None | Some("") => true,
                Some(expected) => expected == value,
            }
        }

        field_matches(&self.id, prompt.id().as_str())
            && field_matches(&self.datapoint, prompt.datapoint())
            && field_matches(&self.clause, prompt.clause())
            && self.status.is_none_or(|status| status == prompt.status())
    }
}

/// Fields accepted by info lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Id,
    Datapoint,
    Clause,
}

impl SearchField {
    /// Single-key filter searching this field for `term`
    pub fn filter(&self, term: &str) -> PromptFilter {
        match self {
            Self::Id => PromptFilter::new().with_id(term),
            Self::Datapoint => PromptFilter::new().with_datapoint(term),
            Self::Clause => PromptFilter::new().with_clause(term),
        }
    }
}

impl FromStr for SearchField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "datapoint" => Ok(Self::Datapoint),
            "clause" => Ok(Self::Clause),
            other => Err(DomainError::invalid_argument(format!(
                "Invalid search field '{}': must be 'id', 'datapoint', or 'clause'",
                other
            ))),
        }
    }
}

/// Template text paired with its notes, notes defaulting to empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPromptNotes {
    pub query_prompt: String,
    pub notes: String,
}

impl From<&Prompt> for QueryPromptNotes {
    fn from(prompt: &Prompt) -> Self {
        Self {
            query_prompt: prompt.query_prompt().to_string(),
            notes: prompt.notes().unwrap_or_default().to_string(),
        }
    }
}

/// Summary row returned by info lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptInfo {
    pub id: String,
    pub query_prompt: String,
    pub notes: Option<String>,
    pub version: u32,
}

impl From<&Prompt> for PromptInfo {
    fn from(prompt: &Prompt) -> Self {
        Self {
            id: prompt.id().to_string(),
            query_prompt: prompt.query_prompt().to_string(),
            notes: prompt.notes().map(str::to_string),
            version: prompt.version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::{NewPrompt, PromptId};

    fn prompt(id: &str, datapoint: &str, clause: &str) -> Prompt {
        Prompt::create(PromptId::new(id), NewPrompt::new(datapoint, clause, "A", "Q")).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PromptFilter::new().matches(&prompt("1", "D", "C")));
    }

    #[test]
    fn test_filter_is_conjunction() {
        let p = prompt("1", "D", "C");

        assert!(PromptFilter::new().with_datapoint("D").with_clause("C").matches(&p));
        assert!(!PromptFilter::new().with_datapoint("D").with_clause("X").matches(&p));
        assert!(PromptFilter::new().with_status(PromptStatus::Latest).matches(&p));
        assert!(!PromptFilter::new().with_status(PromptStatus::Superseded).matches(&p));
    }

    #[test]
    fn test_empty_string_filter_is_ignored() {
        assert!(PromptFilter::new().with_id("").matches(&prompt("1", "D", "C")));
    }

    #[test]
    fn test_search_field_from_str() {
        assert_eq!("id".parse::<SearchField>().unwrap(), SearchField::Id);
        assert_eq!("clause".parse::<SearchField>().unwrap(), SearchField::Clause);
        let error = "bogus_field".parse::<SearchField>().unwrap_err();
        assert!(matches!(error, DomainError::InvalidArgument { .. }));
    }

    #[test]
    fn test_search_field_filter() {
        assert_eq!(
            SearchField::Datapoint.filter("D"),
            PromptFilter::new().with_datapoint("D")
        );
    }

    #[test]
    fn test_query_prompt_notes_defaults_notes() {
        let projection = QueryPromptNotes::from(&prompt("1", "D", "C"));
        assert_eq!(projection.query_prompt, "Q");
        assert_eq!(projection.notes, "");
    }

    #[test]
    fn test_prompt_info_projection() {
        let info = PromptInfo::from(&prompt("1", "D", "C"));
        assert_eq!(info.id, "1");
        assert_eq!(info.version, 1);
        assert!(info.notes.is_none());
    }
}
