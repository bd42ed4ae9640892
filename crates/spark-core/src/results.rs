//! Outcome of a completed training run

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// File name offered when results are downloaded
pub const RESULTS_FILE_NAME: &str = "training-results.json";

/// Metrics recorded at the end of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStat {
    /// 1-based epoch number
    pub epoch: u32,
    pub loss: f64,
    /// Fraction in [0, 1]
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResults {
    pub model_name: String,
    pub dataset_name: String,
    /// Wall time label, e.g. "2h 41m"
    pub training_time: String,
    pub accuracy: f64,
    pub loss: f64,
    pub epoch_stats: Vec<EpochStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_samples: Option<Vec<String>>,
    pub model_url: String,
    pub reward_earned: f64,
}

impl TrainingResults {
    pub fn final_epoch(&self) -> Option<&EpochStat> {
        self.epoch_stats.last()
    }

    /// Indented JSON document offered as [`RESULTS_FILE_NAME`]
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
