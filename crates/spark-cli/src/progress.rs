//! Progress indicators for the terminal

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Percentage bar for a training run
pub fn create_training_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner for catalog lookups
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_has_message() {
        let pb = create_spinner("Loading datasets...");
        assert_eq!(pb.message(), "Loading datasets...");
        pb.finish_and_clear();
    }

    #[test]
    fn test_training_bar_is_percent_scaled() {
        let pb = create_training_bar("Training");
        assert_eq!(pb.length(), Some(100));
        pb.finish_and_clear();
    }
}
