//! Error types for spark-cli

use spark::{CoreError, SparkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Spark(#[from] SparkError),

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Training failed")]
    TrainingFailed,
}

pub type Result<T> = std::result::Result<T, CliError>;
