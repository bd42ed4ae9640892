//! Neural Spark training wizard
//!
//! Application layer over [`spark_core`]: the training backend facade and its
//! mock, the [`WizardSession`] that drives a run, results export and
//! configuration.

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod storage;
pub mod ticker;

// Re-export core types
pub use spark_core::{
    CoreError, Dataset, DatasetId, EpochStat, Gpu, ModelCapabilities, ModelId, NavigationBar,
    ProgressMeter, RESULTS_FILE_NAME, Resolution, StepIndicator, StepState, TrainingConfig,
    TrainingConfigPatch, TrainingResults, TrainingStatus, UploadedFile, WizardState, WizardStep,
};

pub use backend::{
    BackendError, MockBackend, MockDelays, SharedBackend, TrainingBackend, TrainingRequest,
};
pub use config::{BackendConfig, SparkConfig};
pub use error::{Result, SparkError};
pub use export::ResultsExporter;
pub use session::{RunId, RunTicket, SessionOptions, WizardSession};
pub use storage::{LocalStorage, Storage, StorageError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{MockBackend, TrainingBackend};
    pub use crate::session::WizardSession;
    pub use spark_core::{ModelId, TrainingConfigPatch, WizardStep};
}
