use crate::config::TrainingConfig;
use crate::dataset::{Dataset, UploadedFile};
use crate::model::ModelId;
use crate::results::TrainingResults;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Training job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainingStatus {
    #[default]
    Idle,
    Training,
    Complete,
    Error,
}

impl TrainingStatus {
    /// A run has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, TrainingStatus::Complete | TrainingStatus::Error)
    }
}

/// Aggregate state of the wizard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub selected_model: Option<ModelId>,
    pub selected_dataset: Option<Dataset>,
    pub uploaded_file: Option<UploadedFile>,
    pub config: TrainingConfig,
    pub training_status: TrainingStatus,
    pub training_results: Option<TrainingResults>,
}

impl WizardState {
    /// Initial state: default hyperparameters, nothing selected
    pub fn initial() -> Self {
        Self::default()
    }

    /// A hosted dataset or an uploaded file is present
    pub fn has_dataset(&self) -> bool {
        self.selected_dataset.is_some() || self.uploaded_file.is_some()
    }

    /// Name of the training data, hosted dataset first
    pub fn dataset_label(&self) -> &str {
        self.selected_dataset
            .as_ref()
            .map(|d| d.name.as_str())
            .or_else(|| self.uploaded_file.as_ref().map(|f| f.name.as_str()))
            .unwrap_or("Not selected")
    }

    pub fn is_generative(&self) -> bool {
        self.selected_model.is_some_and(|m| m.is_generative())
    }
}
