use serde::{Deserialize, Serialize};

/// Cosmetic progress shown while a run is in flight.
///
/// Ticks never push the value past [`ProgressMeter::CAP`]; only
/// [`complete`](ProgressMeter::complete) reaches 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressMeter {
    value: f64,
}

impl ProgressMeter {
    pub const CAP: f64 = 95.0;
    /// Upper bound (exclusive) of a single random tick
    pub const MAX_TICK: f64 = 5.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Rounded percentage for display
    pub fn percent(&self) -> u8 {
        self.value.round().clamp(0.0, 100.0) as u8
    }

    /// Advance by `increment`. A completed meter ignores ticks.
    pub fn tick(&mut self, increment: f64) {
        if self.value < Self::CAP {
            self.value = (self.value + increment.max(0.0)).min(Self::CAP);
        }
    }

    pub fn complete(&mut self) {
        self.value = 100.0;
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
