//! Filesystem-backed file store
//!
//! Files are written flat under the configured upload directory as
//! `<uuid-v4>.<extension>`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::{FileStore, StoredFile};
use crate::core::error::AppError;

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!("Local file store initialized at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored name to a path inside the root
    fn resolve(&self, system_file_name: &str) -> Result<PathBuf, AppError> {
        let is_plain_name = !system_file_name.is_empty()
            && !system_file_name.contains(['/', '\\'])
            && system_file_name != "."
            && system_file_name != "..";

        if !is_plain_name {
            return Err(AppError::Storage(format!(
                "Invalid stored file name '{}'",
                system_file_name
            )));
        }

        Ok(self.root.join(system_file_name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, data: &[u8], extension: &str) -> Result<StoredFile, AppError> {
        let system_file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.resolve(&system_file_name)?;

        fs::write(&path, data).await.map_err(|e| {
            AppError::Storage(format!("Failed to write file '{}': {}", system_file_name, e))
        })?;

        debug!("Stored {} bytes as '{}'", data.len(), system_file_name);
        Ok(StoredFile {
            system_file_name,
            size: data.len() as u64,
        })
    }

    async fn read(&self, system_file_name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(system_file_name)?;

        fs::read(&path).await.map_err(|e| {
            AppError::Storage(format!("Failed to read file '{}': {}", system_file_name, e))
        })
    }

    async fn delete(&self, system_file_name: &str) -> Result<bool, AppError> {
        let path = self.resolve(system_file_name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted stored file '{}'", system_file_name);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete file '{}': {}",
                system_file_name, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path()).await.unwrap();

        let stored = store.save(b"a,b\n1,2\n", "csv").await.unwrap();
        assert!(stored.system_file_name.ends_with(".csv"));
        assert_eq!(stored.size, 8);
        assert!(dir.path().join(&stored.system_file_name).exists());

        let bytes = assert_ok!(store.read(&stored.system_file_name).await);
        assert_eq!(bytes, b"a,b\n1,2\n");

        assert!(store.delete(&stored.system_file_name).await.unwrap());
        assert!(!store.delete(&stored.system_file_name).await.unwrap());
        assert_err!(store.read(&stored.system_file_name).await);
    }

    #[tokio::test]
    async fn test_generated_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path()).await.unwrap();

        let first = store.save(b"one", "txt").await.unwrap();
        let second = store.save(b"one", "txt").await.unwrap();
        assert_ne!(first.system_file_name, second.system_file_name);
    }

    #[tokio::test]
    async fn test_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("uploads");

        let store = LocalFileStore::new(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.read("../secrets.txt").await,
            Err(AppError::Storage(_))
        ));
        assert_err!(store.delete("..").await);
    }
}
