// PrintLab Filesystem Infrastructure
// Local-disk implementation of the FileStore port

use async_trait::async_trait;
use printlab_core::error::{AppError, Result};
use printlab_core::port::FileStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores uploaded model files under a single upload directory,
/// creating it on demand.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target_path(&self, stored_name: &str) -> Result<PathBuf> {
        // Derived names never contain separators; reject anything else
        // rather than write outside the upload directory.
        if stored_name.contains(['/', '\\']) || stored_name.contains("..") {
            return Err(AppError::Validation(format!(
                "invalid stored filename: {}",
                stored_name
            )));
        }
        Ok(self.root.join(stored_name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, source: &Path, stored_name: &str) -> Result<()> {
        let target = self.target_path(stored_name)?;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::copy(source, &target).await?;

        debug!(source = %source.display(), target = %target.display(), "upload stored");
        Ok(())
    }

    async fn exists(&self, stored_name: &str) -> Result<bool> {
        let target = self.target_path(stored_name)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_copies_into_the_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("uploads"));

        let source = dir.path().join("model.stl");
        tokio::fs::write(&source, b"solid cube").await.unwrap();

        store.store(&source, "job_1_20240101.stl").await.unwrap();

        assert!(store.exists("job_1_20240101.stl").await.unwrap());
        let copied = tokio::fs::read(dir.path().join("uploads/job_1_20240101.stl"))
            .await
            .unwrap();
        assert_eq!(copied, b"solid cube");
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().join("uploads"));

        let err = store
            .store(Path::new("/nonexistent/model.stl"), "job_2_20240101.stl")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
        assert!(!store.exists("job_2_20240101.stl").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        let source = dir.path().join("model.stl");
        tokio::fs::write(&source, b"x").await.unwrap();

        let err = store.store(&source, "../escape.stl").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
