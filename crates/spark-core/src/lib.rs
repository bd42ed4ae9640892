//! # Neural Spark Core
//!
//! Domain types and the wizard state machine behind the Neural Spark
//! training launcher: a pure reducer over [`WizardState`] and a
//! [`StepController`] that gates movement between the five wizard steps.

pub mod config;
pub mod controller;
pub mod dataset;
pub mod error;
pub mod gpu;
pub mod model;
pub mod progress;
pub mod results;
pub mod state;
pub mod step;
pub mod store;

pub use config::{MAX_EPOCHS, Resolution, TrainingConfig, TrainingConfigPatch};
pub use controller::{NavigationBar, StepController, StepIndicator, StepState};
pub use dataset::{
    ACCEPTED_UPLOAD_EXTENSIONS, Dataset, DatasetId, MAX_UPLOAD_BYTES, UploadedFile,
};
pub use error::{CoreError, Result};
pub use gpu::Gpu;
pub use model::{ModelCapabilities, ModelId};
pub use progress::ProgressMeter;
pub use results::{EpochStat, RESULTS_FILE_NAME, TrainingResults};
pub use state::{TrainingStatus, WizardState};
pub use step::{STEP_COUNT, WizardStep, max_allowed_step};
pub use store::{WizardAction, WizardStore, reduce};
