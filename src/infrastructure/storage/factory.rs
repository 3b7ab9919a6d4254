//! Blob store factory for runtime backend selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::domain::storage::BlobStore;
use crate::domain::DomainError;

use super::filesystem::FileSystemBlobStore;
use super::http::HttpBlobStore;
use super::in_memory::InMemoryBlobStore;
use super::snapshot::SnapshotStore;

/// Supported blob backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory blobs (for testing/development)
    InMemory,
    /// Files under a local directory
    FileSystem,
    /// Remote object storage over HTTP
    Http,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "filesystem" | "fs" | "file" | "local" => Some(Self::FileSystem),
            "http" | "https" | "remote" | "blob" => Some(Self::Http),
            _ => None,
        }
    }
}

/// Factory for creating blob stores and snapshot stores from configuration
#[derive(Debug)]
pub struct BlobStoreFactory;

impl BlobStoreFactory {
    /// Creates the blob store named by `config.backend`
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, DomainError> {
        let storage_type = StorageType::from_str(&config.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend '{}'", config.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(Arc::new(InMemoryBlobStore::new())),
            StorageType::FileSystem => {
                let root = PathBuf::from(&config.endpoint).join(&config.container);
                Ok(Arc::new(FileSystemBlobStore::new(root)))
            }
            StorageType::Http => {
                let mut store =
                    HttpBlobStore::new(&config.endpoint, &config.container, config.timeout())?;

                if let Some(token) = &config.access_token {
                    store = store.with_access_token(token);
                }

                Ok(Arc::new(store))
            }
        }
    }

    /// Creates the snapshot store for the configured remote path and staging file
    pub fn create_snapshot_store(config: &StorageConfig) -> Result<SnapshotStore, DomainError> {
        let blob_store = Self::create(config)?;

        Ok(SnapshotStore::new(
            blob_store,
            config.remote_path(),
            config.staging_path(),
        ))
    }
}
