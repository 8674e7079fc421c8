//! Filesystem blob store: one file per document, named by document id.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docshelf_core::{DocumentId, StorageError, StorageResult};

use crate::traits::BlobStore;

/// Blob store writing each document's content to `<dir>/<document id>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    /// Open a blob store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(format!("create blob dir {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, id: DocumentId, bytes: &[u8]) -> StorageResult<()> {
        let path = self.path_for(id);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::io(format!("write blob {}", id), e))
    }

    async fn delete(&self, id: DocumentId) -> StorageResult<()> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(format!("remove blob {}", id), e)),
        }
    }

    fn path_for(&self, id: DocumentId) -> PathBuf {
        self.dir.join(id.to_string())
    }
}
