//! Results export

use crate::error::Result;
use crate::storage::Storage;
use spark_core::{RESULTS_FILE_NAME, TrainingResults};
use std::sync::Arc;
use tracing::info;

/// Writes [`TrainingResults`] as `training-results.json`
#[derive(Clone)]
pub struct ResultsExporter {
    storage: Arc<dyn Storage>,
}

impl ResultsExporter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Write into the storage root. Returns the written path.
    pub async fn export(&self, results: &TrainingResults) -> Result<String> {
        self.export_to(results, "").await
    }

    /// Write into `dir` relative to the storage root. Returns the written path.
    pub async fn export_to(&self, results: &TrainingResults, dir: &str) -> Result<String> {
        let dir = dir.trim_end_matches('/');
        let path = if dir.is_empty() || dir == "." {
            RESULTS_FILE_NAME.to_string()
        } else {
            format!("{dir}/{RESULTS_FILE_NAME}")
        };

        let body = results.to_json_pretty()?;
        self.storage.write(&path, body.as_bytes()).await?;
        info!(path = %path, model = %results.model_name, "Exported training results");
        Ok(path)
    }
}
