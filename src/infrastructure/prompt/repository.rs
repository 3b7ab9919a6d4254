//! Prompt repository - versioned prompt collection backed by snapshot storage

use tracing::{debug, error, info, warn};

use crate::config::{AppConfig, LineageMatch};
use crate::domain::{
    DomainError, NewPrompt, Prompt, PromptFilter, PromptId, PromptInfo, PromptPatch,
    PromptStatus, QueryPromptNotes, SearchField,
};
use crate::infrastructure::storage::{BlobStoreFactory, SnapshotStore};

/// Sole owner of the in-memory prompt collection for the life of the process.
///
/// Records keep creation order (oldest first) and are never removed. Every
/// mutation is followed by a full snapshot save; a failed save is logged and the
/// in-memory change stands. Mutations take `&mut self`: one writer per process,
/// and nothing guards the remote snapshot against a second process.
#[derive(Debug)]
pub struct PromptRepository {
    prompts: Vec<Prompt>,
    snapshots: SnapshotStore,
    lineage_match: LineageMatch,
}

impl PromptRepository {
    /// Load the collection once. Any load failure is logged and the repository starts empty.
    pub async fn open(snapshots: SnapshotStore, lineage_match: LineageMatch) -> Self {
        let prompts = match snapshots.load().await {
            Ok(prompts) => {
                info!(count = prompts.len(), path = snapshots.remote_path(), "Loaded prompts");
                prompts
            }
            Err(e) => {
                warn!(error = %e, path = snapshots.remote_path(), "Error loading prompts, starting empty");
                Vec::new()
            }
        };

        Self {
            prompts,
            snapshots,
            lineage_match,
        }
    }

    /// Build the snapshot store from configuration and open the repository
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let snapshots = BlobStoreFactory::create_snapshot_store(&config.storage)?;
        Ok(Self::open(snapshots, config.registry.lineage_match).await)
    }

    /// Create a prompt, continuing and superseding its (datapoint, clause) lineage if one exists
    pub async fn create(&mut self, input: NewPrompt) -> Result<Prompt, DomainError> {
        let mut prompt = Prompt::create(PromptId::generate(), input).map_err(|e| {
            debug!(error = %e, "Validation error creating prompt");
            DomainError::from(e)
        })?;

        match self.find_lineage_index(prompt.datapoint(), prompt.clause()) {
            Some(index) => {
                prompt.follow(self.prompts[index].version()).map_err(|e| {
                    debug!(error = %e, "Validation error creating prompt version");
                    DomainError::from(e)
                })?;
                let previous = &mut self.prompts[index];
                previous.supersede();

                info!(
                    prompt_id = %prompt.id(),
                    superseded_id = %previous.id(),
                    version = prompt.version(),
                    "Created prompt version"
                );
            }
            None => {
                info!(prompt_id = %prompt.id(), version = prompt.version(), "Created prompt");
            }
        }

        self.prompts.push(prompt.clone());
        self.persist().await;
        Ok(prompt)
    }

    /// Overwrite fields of an existing prompt in place. Version and status only change if the patch says so.
    pub async fn update(&mut self, id: &str, patch: PromptPatch) -> Result<Prompt, DomainError> {
        let index = self
            .prompts
            .iter()
            .position(|p| p.id().as_str() == id)
            .ok_or_else(|| {
                debug!(prompt_id = %id, "No prompt found to update");
                DomainError::not_found(format!("No prompt found with id {}", id))
            })?;

        let updated = self.prompts[index].patched(&patch).map_err(|e| {
            debug!(prompt_id = %id, error = %e, "Validation error updating prompt");
            DomainError::from(e)
        })?;

        self.prompts[index] = updated.clone();
        info!(prompt_id = %id, "Updated prompt");

        self.persist().await;
        Ok(updated)
    }

    /// Prompts matching every supplied filter, in collection order
    pub fn query(&self, filter: &PromptFilter) -> Vec<Prompt> {
        self.prompts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Prompt> {
        self.prompts.iter().find(|p| p.id().as_str() == id).cloned()
    }

    /// Template text and notes of every prompt for `datapoint`
    pub fn get_query_prompts_and_notes(&self, datapoint: &str) -> Vec<QueryPromptNotes> {
        self.prompts
            .iter()
            .filter(|p| p.datapoint() == datapoint)
            .map(QueryPromptNotes::from)
            .collect()
    }

    /// Summaries of prompts whose `field` (`id`, `datapoint` or `clause`) equals `term`.
    ///
    /// An unrecognized field is logged and yields an empty result.
    pub fn get_prompts_info(&self, term: &str, field: &str) -> Vec<PromptInfo> {
        let field = match field.parse::<SearchField>() {
            Ok(field) => field,
            Err(e) => {
                warn!(error = %e, "Rejected prompt info lookup");
                return Vec::new();
            }
        };

        self.query(&field.filter(term))
            .iter()
            .map(PromptInfo::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    fn find_lineage_index(&self, datapoint: &str, clause: &str) -> Option<usize> {
        match self.lineage_match {
            // Can pick an already superseded record once a lineage has three entries
            LineageMatch::FirstMatch => self.lineage_position(datapoint, clause, None),
            LineageMatch::Latest => self
                .lineage_position(datapoint, clause, Some(PromptStatus::Latest))
                .or_else(|| self.lineage_position(datapoint, clause, None)),
        }
    }

    fn lineage_position(
        &self,
        datapoint: &str,
        clause: &str,
        status: Option<PromptStatus>,
    ) -> Option<usize> {
        self.prompts.iter().position(|p| {
            p.in_lineage(datapoint, clause) && status.is_none_or(|s| p.status() == s)
        })
    }

    async fn persist(&self) {
        if let Err(e) = self.snapshots.save(&self.prompts).await {
            error!(
                error = %e,
                path = self.snapshots.remote_path(),
                "Error saving prompts, changes are held in memory only"
            );
        }
    }
}
