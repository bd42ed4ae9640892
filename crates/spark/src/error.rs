//! Error types for spark crate

use spark_core::WizardStep;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparkError {
    #[error("Core error: {0}")]
    Core(#[from] spark_core::CoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] crate::backend::BackendError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("Select a model first")]
    ModelRequired,

    #[error("Select a dataset or upload a file first")]
    DatasetRequired,

    #[error("A training run is already in progress")]
    TrainingInProgress,

    #[error("Training can only start from the training step, current step is {0}")]
    NotOnTrainingStep(WizardStep),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Unknown GPU: {0}")]
    UnknownGpu(String),

    #[error("GPU is not available: {0}")]
    GpuUnavailable(String),

    #[error("No training results yet")]
    NoResults,
}

pub type Result<T> = std::result::Result<T, SparkError>;
