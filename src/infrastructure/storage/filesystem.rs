//! Directory-backed blob store

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::domain::storage::BlobStore;
use crate::domain::PersistenceError;

/// Blob store keeping each blob as a file below a root directory
#[derive(Debug, Clone)]
pub struct FileSystemBlobStore {
    root: PathBuf,
}

impl FileSystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, PersistenceError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || escapes {
            return Err(PersistenceError::transport(format!(
                "Invalid blob path '{}'",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FileSystemBlobStore {
    async fn exists(&self, path: &str) -> Result<bool, PersistenceError> {
        let file = self.resolve(path)?;
        Ok(fs::try_exists(&file).await?)
    }

    async fn download(&self, path: &str) -> Result<Bytes, PersistenceError> {
        let file = self.resolve(path)?;

        match fs::read(&file).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PersistenceError::not_found(path)),
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(&self, path: &str, data: Bytes, overwrite: bool) -> Result<(), PersistenceError> {
        let file = self.resolve(path)?;

        if !overwrite && fs::try_exists(&file).await? {
            return Err(PersistenceError::conflict(path));
        }

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&file, &data).await?;
        Ok(())
    }
}
