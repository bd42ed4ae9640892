//! Wizard state store
//!
//! All mutation goes through [`WizardAction`]s applied by the pure [`reduce`]
//! function. [`WizardStore`] owns the current snapshot and is handed to
//! callers explicitly.

use crate::config::TrainingConfigPatch;
use crate::dataset::{Dataset, UploadedFile};
use crate::model::ModelId;
use crate::results::TrainingResults;
use crate::state::{TrainingStatus, WizardState};
use strum::AsRefStr;
use tracing::debug;

/// Named state transitions
#[derive(Debug, Clone, PartialEq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WizardAction {
    SetModel(ModelId),
    SetDataset(Dataset),
    SetUploadedFile(UploadedFile),
    UpdateConfig(TrainingConfigPatch),
    /// Replaces the status. Any status other than `Complete` drops stale results.
    SetTrainingStatus(TrainingStatus),
    SetTrainingResults(TrainingResults),
    /// Stores results and marks the run complete in one transition
    CompleteTraining(TrainingResults),
    Reset,
}

/// Apply one action to a state snapshot
pub fn reduce(state: WizardState, action: WizardAction) -> WizardState {
    match action {
        WizardAction::SetModel(model) => WizardState {
            selected_model: Some(model),
            ..state
        },
        WizardAction::SetDataset(dataset) => WizardState {
            selected_dataset: Some(dataset),
            ..state
        },
        WizardAction::SetUploadedFile(file) => WizardState {
            uploaded_file: Some(file),
            ..state
        },
        WizardAction::UpdateConfig(patch) => WizardState {
            config: state.config.merged(patch),
            ..state
        },
        WizardAction::SetTrainingStatus(status) => {
            let training_results = if status == TrainingStatus::Complete {
                state.training_results
            } else {
                None
            };
            WizardState {
                training_status: status,
                training_results,
                ..state
            }
        }
        WizardAction::SetTrainingResults(results) => WizardState {
            training_results: Some(results),
            ..state
        },
        WizardAction::CompleteTraining(results) => WizardState {
            training_status: TrainingStatus::Complete,
            training_results: Some(results),
            ..state
        },
        WizardAction::Reset => WizardState::initial(),
    }
}

/// Holder of the current wizard state
#[derive(Debug, Clone, Default)]
pub struct WizardStore {
    state: WizardState,
    revision: u64,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_state(state: WizardState) -> Self {
        Self { state, revision: 0 }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Number of actions applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an action and return the new snapshot
    pub fn dispatch(&mut self, action: WizardAction) -> &WizardState {
        debug!(action = action.as_ref(), revision = self.revision + 1, "Dispatching wizard action");
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        self.revision += 1;
        &self.state
    }

    pub fn set_model(&mut self, model: ModelId) -> &WizardState {
        self.dispatch(WizardAction::SetModel(model))
    }

    pub fn set_dataset(&mut self, dataset: Dataset) -> &WizardState {
        self.dispatch(WizardAction::SetDataset(dataset))
    }

    pub fn set_uploaded_file(&mut self, file: UploadedFile) -> &WizardState {
        self.dispatch(WizardAction::SetUploadedFile(file))
    }

    pub fn update_config(&mut self, patch: TrainingConfigPatch) -> &WizardState {
        self.dispatch(WizardAction::UpdateConfig(patch))
    }

    pub fn set_training_status(&mut self, status: TrainingStatus) -> &WizardState {
        self.dispatch(WizardAction::SetTrainingStatus(status))
    }

    pub fn set_training_results(&mut self, results: TrainingResults) -> &WizardState {
        self.dispatch(WizardAction::SetTrainingResults(results))
    }

    pub fn complete_training(&mut self, results: TrainingResults) -> &WizardState {
        self.dispatch(WizardAction::CompleteTraining(results))
    }

    pub fn reset(&mut self) -> &WizardState {
        self.dispatch(WizardAction::Reset)
    }
}
