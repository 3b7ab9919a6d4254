//! Full-collection snapshot persistence
//!
//! The collection is always read and written as a whole: a JSON array staged in a
//! local file and mirrored to the blob store. The staging write and the upload are
//! two independent steps; a failed upload leaves the staging file ahead of the
//! remote copy.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::debug;

use crate::domain::storage::BlobStore;
use crate::domain::{PersistenceError, Prompt};

/// Loads and saves the prompt collection through a staging file and a blob store
pub struct SnapshotStore {
    blob_store: Arc<dyn BlobStore>,
    remote_path: String,
    staging_path: PathBuf,
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("remote_path", &self.remote_path)
            .field("staging_path", &self.staging_path)
            .finish_non_exhaustive()
    }
}

impl SnapshotStore {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        remote_path: impl Into<String>,
        staging_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            blob_store,
            remote_path: remote_path.into(),
            staging_path: staging_path.into(),
        }
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Fetch the remote snapshot. A missing blob is an empty collection, not an error.
    pub async fn load(&self) -> Result<Vec<Prompt>, PersistenceError> {
        if !self.blob_store.exists(&self.remote_path).await? {
            debug!(path = %self.remote_path, "Snapshot blob not found");
            return Ok(Vec::new());
        }

        let data = self.blob_store.download(&self.remote_path).await?;
        self.write_staging(&data).await?;

        let prompts: Vec<Prompt> = serde_json::from_slice(&data)?;
        debug!(path = %self.remote_path, count = prompts.len(), "Loaded snapshot");
        Ok(prompts)
    }

    /// Replace the staging file with the full collection, then upload it with overwrite
    pub async fn save(&self, prompts: &[Prompt]) -> Result<(), PersistenceError> {
        let data = encode_snapshot(prompts)?;
        self.write_staging(&data).await?;

        let staged = fs::read(&self.staging_path).await?;
        self.blob_store
            .upload(&self.remote_path, Bytes::from(staged), true)
            .await?;

        debug!(path = %self.remote_path, count = prompts.len(), "Saved snapshot");
        Ok(())
    }

    async fn write_staging(&self, data: &[u8]) -> Result<(), PersistenceError> {
        if let Some(parent) = self
            .staging_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.staging_path, data).await?;
        Ok(())
    }
}

/// Serialize the collection as a four-space indented JSON array
pub fn encode_snapshot(prompts: &[Prompt]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));

    prompts.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::MockBlobStore;
    use crate::domain::{NewPrompt, PromptId, PromptStatus};
    use crate::infrastructure::storage::InMemoryBlobStore;

    fn prompt(id: &str, query_prompt: &str) -> Prompt {
        Prompt::create(
            PromptId::new(id),
            NewPrompt::new("What is the Rent?", "Rent", "A", query_prompt).with_notes("n"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_blob_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut blob_store = MockBlobStore::new();
        blob_store.expect_exists().returning(|_| Ok(false));
        blob_store.expect_download().never();

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        assert!(store.load().await.unwrap().is_empty());
        assert!(!dir.path().join("prompts.json").exists());
    }

    #[tokio::test]
    async fn test_load_writes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = encode_snapshot(&[prompt("p-1", "Q1")]).unwrap();
        let blob_store = InMemoryBlobStore::new().with_blob("prompts.json", data.clone());
        let staging = dir.path().join("staging").join("prompts.json");

        let store = SnapshotStore::new(Arc::new(blob_store), "prompts.json", &staging);
        let prompts = store.load().await.unwrap();

        assert_eq!(prompts, vec![prompt("p-1", "Q1")]);
        assert_eq!(std::fs::read(&staging).unwrap(), data);
    }

    #[tokio::test]
    async fn test_load_transport_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut blob_store = MockBlobStore::new();
        blob_store
            .expect_exists()
            .returning(|_| Err(PersistenceError::transport("unauthorized")));

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        let result = store.load().await;
        assert!(matches!(result, Err(PersistenceError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_load_unwritable_staging_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file.txt");
        std::fs::write(&blocker, "not a directory").unwrap();
        let blob_store = InMemoryBlobStore::new().with_blob("prompts.json", "[]");

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            blocker.join("prompts.json"),
        );

        let result = store.load().await;
        assert!(matches!(result, Err(PersistenceError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let blob_store = InMemoryBlobStore::new().with_blob("prompts.json", "{not json");

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        let result = store.load().await;
        assert!(matches!(result, Err(PersistenceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_record_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let blob_store = InMemoryBlobStore::new().with_blob(
            "prompts.json",
            r#"[{"id": "p-1", "datapoint": "D", "clause": "C", "created_by": "A", "query_prompt": "Q", "version": 0}]"#,
        );

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        let result = store.load().await;
        assert!(matches!(result, Err(PersistenceError::Parse(_))));
    }

    #[tokio::test]
    async fn test_save_uploads_with_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut blob_store = MockBlobStore::new();
        blob_store
            .expect_upload()
            .withf(|path, data, overwrite| {
                path == "prompts.json" && *overwrite && data.starts_with(b"[\n    {")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let store = SnapshotStore::new(
            Arc::new(blob_store),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        store.save(&[prompt("p-1", "Q1")]).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_upload_failure_keeps_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("prompts.json");
        let mut blob_store = MockBlobStore::new();
        blob_store
            .expect_upload()
            .returning(|_, _, _| Err(PersistenceError::transport("network down")));

        let store = SnapshotStore::new(Arc::new(blob_store), "prompts.json", &staging);
        let result = store.save(&[prompt("p-1", "Q1")]).await;

        assert!(matches!(result, Err(PersistenceError::Transport { .. })));
        let staged: Vec<Prompt> = serde_json::from_slice(&std::fs::read(&staging).unwrap()).unwrap();
        assert_eq!(staged.len(), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let blob_store = Arc::new(InMemoryBlobStore::new());
        let store = SnapshotStore::new(
            blob_store.clone(),
            "prompts.json",
            dir.path().join("prompts.json"),
        );

        store
            .save(&[prompt("p-1", "Q1"), prompt("p-2", "Q2")])
            .await
            .unwrap();
        store.save(&[prompt("p-3", "Q3")]).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id().as_str(), "p-3");
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut superseded = prompt("p-1", "Q1");
        superseded.supersede();
        let prompts = vec![superseded, prompt("p-2", "Q2")];

        let store = SnapshotStore::new(
            Arc::new(InMemoryBlobStore::new()),
            "prompts.json",
            dir.path().join("prompts.json"),
        );
        store.save(&prompts).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, prompts);
        assert_eq!(reloaded[0].status(), PromptStatus::Superseded);
    }
}
