//! Error types for spark-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown resolution: {0}")]
    UnknownResolution(String),

    #[error("Unknown config field: {0}")]
    UnknownConfigField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidConfigValue { field: String, value: String },

    #[error("Validation split must lie in [0, 1], got {0}")]
    ValidationSplitOutOfRange(f64),

    #[error("Seed must be a positive integer")]
    InvalidSeed,

    #[error("Unsupported file type: {0} (accepted: .csv, .json, .zip)")]
    UnsupportedFileType(String),

    #[error("File {name} is {size_bytes} bytes, the limit is 10GB")]
    FileTooLarge { name: String, size_bytes: u64 },

    #[error("Unknown wizard step: {0}")]
    UnknownStep(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
