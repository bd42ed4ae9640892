use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Storage, StorageError, StorageResult};

/// Local filesystem storage rooted at a base directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Join a relative path onto the base, refusing to escape it
    fn full_path(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes || path.trim().is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn write(&self, path: &str, content: &[u8]) -> StorageResult<()> {
        let full_path = self.full_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("spark-storage-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_write_creates_parents() {
        let base = temp_dir();
        let storage = LocalStorage::new(&base);
        storage.write("runs/a/out.json", b"{}").await.unwrap();

        assert_eq!(fs::read(base.join("runs/a/out.json")).await.unwrap(), b"{}");

        storage.write("runs/a/out.json", b"[]").await.unwrap();
        assert_eq!(fs::read(base.join("runs/a/out.json")).await.unwrap(), b"[]");

        fs::remove_dir_all(&base).await.ok();
    }

    #[tokio::test]
    async fn test_escaping_paths_are_rejected() {
        let storage = LocalStorage::new(temp_dir());
        for path in ["../escape.json", "/etc/passwd", ""] {
            let err = storage.write(path, b"x").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidPath(_)), "{path}");
        }
    }
}
