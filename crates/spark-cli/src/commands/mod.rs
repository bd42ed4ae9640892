//! CLI command handlers

pub mod catalog;
pub mod train;
pub mod wizard;

pub use catalog::{run_datasets, run_gpus, run_models};
pub use train::{TrainOptions, run_train};
pub use wizard::run_wizard;
