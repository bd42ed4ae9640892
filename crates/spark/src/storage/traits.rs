use async_trait::async_trait;

use super::StorageResult;

/// Destination for exported files
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write file contents at a relative path, creating parent directories
    async fn write(&self, path: &str, content: &[u8]) -> StorageResult<()>;
}
