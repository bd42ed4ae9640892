//! Training backend facade
//!
//! The only place the wizard performs (simulated) I/O. [`MockBackend`] serves
//! canned catalogs and generated results after fixed delays.

pub mod catalog;
pub mod error;
pub mod mock;

pub use error::{BackendError, Result};
pub use mock::{MockBackend, MockDelays};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spark_core::{Dataset, Gpu, ModelId, TrainingConfig, TrainingResults, UploadedFile, WizardState};
use std::sync::Arc;

/// Snapshot of the wizard state a run is launched with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    pub model: Option<ModelId>,
    pub dataset: Option<Dataset>,
    pub uploaded_file: Option<UploadedFile>,
    pub config: TrainingConfig,
}

impl From<&WizardState> for TrainingRequest {
    fn from(state: &WizardState) -> Self {
        Self {
            model: state.selected_model,
            dataset: state.selected_dataset.clone(),
            uploaded_file: state.uploaded_file.clone(),
            config: state.config.clone(),
        }
    }
}

/// Async operations the wizard relies on
#[async_trait]
pub trait TrainingBackend: Send + Sync {
    /// Hosted datasets offered for training
    async fn list_datasets(&self) -> Result<Vec<Dataset>>;

    /// GPU offers, available or not
    async fn list_gpus(&self) -> Result<Vec<Gpu>>;

    /// Run a training job and report its outcome
    async fn run_training(&self, request: &TrainingRequest) -> Result<TrainingResults>;

    /// Short backend name for logs
    fn name(&self) -> &str {
        "backend"
    }
}

pub type SharedBackend = Arc<dyn TrainingBackend>;

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::{TrainingConfigPatch, WizardStore};

    #[test]
    fn test_request_snapshots_state() {
        let mut store = WizardStore::new();
        store.set_model(ModelId::Whisper);
        store.set_uploaded_file(UploadedFile::new("speech.zip", 2_048));
        store.update_config(TrainingConfigPatch::new().epochs(4));

        let request = TrainingRequest::from(store.state());
        assert_eq!(request.model, Some(ModelId::Whisper));
        assert!(request.dataset.is_none());
        assert_eq!(request.uploaded_file.as_ref().map(|f| f.size_bytes), Some(2_048));
        assert_eq!(request.config.epochs, Some(4));
    }
}
