//! In-memory blob store implementation

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::storage::BlobStore;
use crate::domain::PersistenceError;

/// Thread-safe in-memory blob store
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryBlobStore {
    /// Creates a new empty blob store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one blob
    pub fn with_blob(mut self, path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.blobs
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), data.into());
        self
    }

    /// Returns a copy of the blob at `path`, if any
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn exists(&self, path: &str) -> Result<bool, PersistenceError> {
        let blobs = self.blobs.read().map_err(|e| {
            PersistenceError::transport(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(blobs.contains_key(path))
    }

    async fn download(&self, path: &str) -> Result<Bytes, PersistenceError> {
        let blobs = self.blobs.read().map_err(|e| {
            PersistenceError::transport(format!("Failed to acquire read lock: {}", e))
        })?;

        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| PersistenceError::not_found(path))
    }

    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), PersistenceError> {
        let mut blobs = self.blobs.write().map_err(|e| {
            PersistenceError::transport(format!("Failed to acquire write lock: {}", e))
        })?;

        if !overwrite && blobs.contains_key(path) {
            return Err(PersistenceError::conflict(path));
        }

        blobs.insert(path.to_string(), data);
        Ok(())
    }
}
