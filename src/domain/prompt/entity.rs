//! Prompt entity and related types

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

use super::validation::{validate_prompt, PromptValidationError};
use crate::domain::DomainError;

/// Free-form evaluation scores attached to a prompt
pub type Score = Map<String, Value>;

fn default_version() -> u32 {
    1
}

/// Keeps an explicit `null` distinct from a missing key: `Some(None)` vs `None`
fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Prompt identifier, a UUID string assigned at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(String);

impl PromptId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Draw a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PromptId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state of a prompt within its lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStatus {
    #[default]
    Latest,
    Superseded,
}

impl PromptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for PromptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "superseded" => Ok(Self::Superseded),
            other => Err(DomainError::invalid_argument(format!(
                "Unknown prompt status '{}': expected 'latest' or 'superseded'",
                other
            ))),
        }
    }
}

/// A versioned prompt template keyed by (datapoint, clause)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(try_from = "PromptRecord")]
pub struct Prompt {
    id: PromptId,
    #[validate(length(min = 1, message = "datapoint is required"))]
    datapoint: String,
    #[validate(length(min = 1, message = "clause is required"))]
    clause: String,
    #[validate(length(min = 1, message = "created_by is required"))]
    created_by: String,
    #[validate(length(min = 1, message = "query_prompt is required"))]
    query_prompt: String,
    #[validate(range(min = 1, message = "version must be at least 1"))]
    version: u32,
    #[validate(range(max = 1, message = "evaluated must be 0 or 1"))]
    evaluated: u8,
    status: PromptStatus,
    score: Option<Score>,
    notes: Option<String>,
}

/// Wire shape of a stored prompt, checked before it becomes a `Prompt`
#[derive(Debug, Deserialize)]
struct PromptRecord {
    id: PromptId,
    datapoint: String,
    clause: String,
    created_by: String,
    query_prompt: String,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    evaluated: u8,
    #[serde(default)]
    status: PromptStatus,
    #[serde(default)]
    score: Option<Score>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<PromptRecord> for Prompt {
    type Error = PromptValidationError;

    fn try_from(record: PromptRecord) -> Result<Self, Self::Error> {
        let prompt = Self {
            id: record.id,
            datapoint: record.datapoint,
            clause: record.clause,
            created_by: record.created_by,
            query_prompt: record.query_prompt,
            version: record.version,
            evaluated: record.evaluated,
            status: record.status,
            score: record.score,
            notes: record.notes,
        };

        validate_prompt(&prompt)?;
        Ok(prompt)
    }
}

impl Prompt {
    /// Build and validate a prompt from creation input
    pub fn create(id: PromptId, input: NewPrompt) -> Result<Self, PromptValidationError> {
        let prompt = Self {
            id,
            datapoint: input.datapoint,
            clause: input.clause,
            created_by: input.created_by,
            query_prompt: input.query_prompt,
            version: input.version,
            evaluated: input.evaluated,
            status: input.status,
            score: input.score,
            notes: input.notes,
        };

        validate_prompt(&prompt)?;
        Ok(prompt)
    }

    /// Produce a validated copy with the patch applied; `self` is left untouched
    pub fn patched(&self, patch: &PromptPatch) -> Result<Self, PromptValidationError> {
        let mut candidate = self.clone();

        if let Some(datapoint) = &patch.datapoint {
            candidate.datapoint = datapoint.clone();
        }
        if let Some(clause) = &patch.clause {
            candidate.clause = clause.clone();
        }
        if let Some(created_by) = &patch.created_by {
            candidate.created_by = created_by.clone();
        }
        if let Some(query_prompt) = &patch.query_prompt {
            candidate.query_prompt = query_prompt.clone();
        }
        if let Some(version) = patch.version {
            candidate.version = version;
        }
        if let Some(evaluated) = patch.evaluated {
            candidate.evaluated = evaluated;
        }
        if let Some(status) = patch.status {
            candidate.status = status;
        }
        if let Some(score) = &patch.score {
            candidate.score = score.clone();
        }
        if let Some(notes) = &patch.notes {
            candidate.notes = notes.clone();
        }

        validate_prompt(&candidate)?;
        Ok(candidate)
    }

    // Getters

    pub fn id(&self) -> &PromptId {
        &self.id
    }

    pub fn datapoint(&self) -> &str {
        &self.datapoint
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn query_prompt(&self) -> &str {
        &self.query_prompt
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn evaluated(&self) -> u8 {
        self.evaluated
    }

    pub fn status(&self) -> PromptStatus {
        self.status
    }

    pub fn is_latest(&self) -> bool {
        self.status == PromptStatus::Latest
    }

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Whether this prompt belongs to the (datapoint, clause) lineage
    pub fn in_lineage(&self, datapoint: &str, clause: &str) -> bool {
        self.datapoint == datapoint && self.clause == clause
    }

    // Lineage mutators, driven by the repository

    pub(crate) fn follow(&mut self, previous_version: u32) -> Result<(), PromptValidationError> {
        self.version = previous_version
            .checked_add(1)
            .ok_or(PromptValidationError::VersionOverflow { previous_version })?;
        self.evaluated = 0;
        Ok(())
    }

    pub(crate) fn supersede(&mut self) {
        self.status = PromptStatus::Superseded;
    }
}

/// Input for creating a prompt; the identifier is always assigned by the repository
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPrompt {
    pub datapoint: String,
    pub clause: String,
    pub created_by: String,
    pub query_prompt: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub evaluated: u8,
    #[serde(default)]
    pub status: PromptStatus,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPrompt {
    pub fn new(
        datapoint: impl Into<String>,
        clause: impl Into<String>,
        created_by: impl Into<String>,
        query_prompt: impl Into<String>,
    ) -> Self {
        Self {
            datapoint: datapoint.into(),
            clause: clause.into(),
            created_by: created_by.into(),
            query_prompt: query_prompt.into(),
            version: default_version(),
            evaluated: 0,
            status: PromptStatus::default(),
            score: None,
            notes: None,
        }
    }

    /// Read creation input from a JSON field map; extra keys such as `id` are ignored
    pub fn from_json(value: Value) -> Result<Self, PromptValidationError> {
        serde_json::from_value(value).map_err(|e| PromptValidationError::Malformed(e.to_string()))
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_evaluated(mut self, evaluated: u8) -> Self {
        self.evaluated = evaluated;
        self
    }

    pub fn with_status(mut self, status: PromptStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Field overwrites for an existing prompt. Identity cannot be patched.
///
/// `score` and `notes` are cleared by `Some(None)`, i.e. an explicit JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptPatch {
    pub datapoint: Option<String>,
    pub clause: Option<String>,
    pub created_by: Option<String>,
    pub query_prompt: Option<String>,
    pub version: Option<u32>,
    pub evaluated: Option<u8>,
    pub status: Option<PromptStatus>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub score: Option<Option<Score>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub notes: Option<Option<String>>,
}

impl PromptPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a patch from a JSON field map; unknown keys (including `id`) are refused
    pub fn from_json(value: Value) -> Result<Self, PromptValidationError> {
        serde_json::from_value(value).map_err(|e| PromptValidationError::Malformed(e.to_string()))
    }

    pub fn with_query_prompt(mut self, query_prompt: impl Into<String>) -> Self {
        self.query_prompt = Some(query_prompt.into());
        self
    }

    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    pub fn with_evaluated(mut self, evaluated: u8) -> Self {
        self.evaluated = Some(evaluated);
        self
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = Some(Some(score));
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(Some(notes.into()));
        self
    }

    pub fn clear_score(mut self) -> Self {
        self.score = Some(None);
        self
    }

    pub fn clear_notes(mut self) -> Self {
        self.notes = Some(None);
        self
    }
}
