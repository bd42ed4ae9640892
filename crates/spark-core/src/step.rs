use crate::error::{CoreError, Result};
use crate::state::{TrainingStatus, WizardState};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Number of wizard steps
pub const STEP_COUNT: usize = 5;

/// Wizard steps in order. Ordering follows the step index.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    #[strum(to_string = "Select Model")]
    SelectModel,
    #[strum(to_string = "Choose Dataset")]
    ChooseDataset,
    #[strum(to_string = "Configure Training")]
    Configure,
    #[strum(to_string = "Start Training")]
    StartTraining,
    #[strum(to_string = "View Results")]
    ViewResults,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::SelectModel;
    pub const LAST: WizardStep = WizardStep::ViewResults;

    pub fn all() -> Vec<WizardStep> {
        WizardStep::iter().collect()
    }

    /// 0-based index
    pub fn index(self) -> usize {
        match self {
            WizardStep::SelectModel => 0,
            WizardStep::ChooseDataset => 1,
            WizardStep::Configure => 2,
            WizardStep::StartTraining => 3,
            WizardStep::ViewResults => 4,
        }
    }

    pub fn from_index(index: usize) -> Result<WizardStep> {
        WizardStep::iter()
            .nth(index)
            .ok_or(CoreError::UnknownStep(index))
    }

    /// Following step, saturating at the last
    pub fn next(self) -> WizardStep {
        WizardStep::iter().nth(self.index() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, saturating at the first
    pub fn previous(self) -> WizardStep {
        self.index()
            .checked_sub(1)
            .and_then(|i| WizardStep::iter().nth(i))
            .unwrap_or(Self::FIRST)
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

/// Furthest step the current state unlocks
pub fn max_allowed_step(state: &WizardState) -> WizardStep {
    if state.selected_model.is_none() {
        WizardStep::SelectModel
    } else if !state.has_dataset() {
        WizardStep::ChooseDataset
    } else if state.training_status != TrainingStatus::Complete {
        WizardStep::StartTraining
    } else {
        WizardStep::ViewResults
    }
}
