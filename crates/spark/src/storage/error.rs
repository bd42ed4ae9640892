use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Absolute or escaping path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
