//! Neural Spark CLI library

pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

use error::{CliError, Result};
use spark::{MockBackend, SessionOptions, SparkConfig, WizardSession};
use std::path::Path;
use std::sync::Arc;

/// Load the config file when given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<SparkConfig> {
    match path {
        Some(path) => SparkConfig::load_from_file(path).map_err(|e| CliError::Config(e.to_string())),
        None => Ok(SparkConfig::default()),
    }
}

/// Session over a mock backend built from `config`
pub fn build_session(config: &SparkConfig) -> WizardSession {
    let backend = Arc::new(MockBackend::from_config(&config.backend));
    WizardSession::with_options(backend, SessionOptions::from_config(config))
}
