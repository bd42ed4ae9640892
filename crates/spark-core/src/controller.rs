//! Step controller
//!
//! Tracks the current wizard step and gates navigation against the
//! wizard state. Illegal jumps are ignored rather than reported, matching
//! a stepper whose locked steps simply do not respond to clicks.

use crate::state::WizardState;
use crate::step::{STEP_COUNT, WizardStep, max_allowed_step};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a step is drawn in the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Upcoming,
}

/// One entry of the stepper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepIndicator {
    pub step: WizardStep,
    pub index: usize,
    pub label: String,
    pub state: StepState,
    /// Clicking the step would move there
    pub reachable: bool,
}

/// Back/next controls under the step content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationBar {
    pub show_back: bool,
    pub show_next: bool,
    pub next_enabled: bool,
    pub next_label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepController {
    current: WizardStep,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    /// Move forward one step. No effect on the last step.
    pub fn advance(&mut self) -> WizardStep {
        self.current = self.current.next();
        self.current
    }

    /// Move back one step. No effect on the first step.
    pub fn retreat(&mut self) -> WizardStep {
        self.current = self.current.previous();
        self.current
    }

    /// Whether `target` is reachable from the current step
    pub fn can_jump_to(&self, target: WizardStep, state: &WizardState) -> bool {
        target.index() <= self.current.index() + 1 && target <= max_allowed_step(state)
    }

    /// Jump to `target` if allowed. Returns whether the jump was taken.
    pub fn jump_to(&mut self, target: WizardStep, state: &WizardState) -> bool {
        if !self.can_jump_to(target, state) {
            debug!(from = %self.current, to = %target, "Ignoring locked step");
            return false;
        }
        self.current = target;
        true
    }

    /// Index based variant of [`jump_to`](Self::jump_to); out of range indices are ignored.
    pub fn jump_to_index(&mut self, index: usize, state: &WizardState) -> bool {
        match WizardStep::from_index(index) {
            Ok(target) => self.jump_to(target, state),
            Err(_) => false,
        }
    }

    /// Move straight to the results once a run completes
    pub fn show_results(&mut self) {
        self.current = WizardStep::ViewResults;
    }

    pub fn reset(&mut self) {
        self.current = WizardStep::FIRST;
    }

    pub fn max_allowed(&self, state: &WizardState) -> WizardStep {
        max_allowed_step(state)
    }

    /// Fill fraction of the stepper's progress line
    pub fn progress_fraction(&self) -> f64 {
        self.current.index() as f64 / (STEP_COUNT - 1) as f64
    }

    pub fn navigation(&self) -> NavigationBar {
        let in_middle = self.current > WizardStep::SelectModel && self.current < WizardStep::ViewResults;
        let on_training = self.current == WizardStep::StartTraining;
        NavigationBar {
            show_back: in_middle,
            show_next: in_middle,
            next_enabled: !on_training,
            next_label: if on_training {
                "Training in Progress"
            } else {
                "Next Step"
            },
        }
    }

    pub fn stepper(&self, state: &WizardState) -> Vec<StepIndicator> {
        WizardStep::all()
            .into_iter()
            .map(|step| StepIndicator {
                step,
                index: step.index(),
                label: step.label(),
                state: match step.cmp(&self.current) {
                    std::cmp::Ordering::Less => StepState::Completed,
                    std::cmp::Ordering::Equal => StepState::Current,
                    std::cmp::Ordering::Greater => StepState::Upcoming,
                },
                reachable: self.can_jump_to(step, state),
            })
            .collect()
    }
}
