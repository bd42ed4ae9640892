use thiserror::Error;

/// Failure of a facade call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Training rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;
