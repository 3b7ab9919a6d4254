//! Blob store trait definition

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::PersistenceError;

#[cfg(test)]
use mockall::automock;

/// Opaque object storage holding whole snapshots under string paths.
///
/// Credentials and transport are the implementation's concern.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Checks whether a blob exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, PersistenceError>;

    /// Downloads the full contents of the blob at `path`
    async fn download(&self, path: &str) -> Result<Bytes, PersistenceError>;

    /// Uploads `data` to `path`; with `overwrite == false` an existing blob is a conflict
    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), PersistenceError>;
}
