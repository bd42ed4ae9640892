use serde::{Deserialize, Serialize};
use std::path::Path;

/// Neural Spark configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkConfig {
    /// Log level
    pub log_level: String,

    /// Directory results are exported into
    pub export_dir: String,

    /// Interval between cosmetic progress ticks
    pub progress_tick_ms: u64,

    /// Mock backend behaviour
    pub backend: BackendConfig,
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            export_dir: ".".to_string(),
            progress_tick_ms: 250,
            backend: BackendConfig::default(),
        }
    }
}

impl SparkConfig {
    /// Load from configuration file, TOML when the extension says so, JSON otherwise
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
        } else {
            serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
        }
    }
}

/// Mock backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub dataset_delay_ms: u64,
    pub gpu_delay_ms: u64,
    pub training_delay_ms: u64,

    /// Seed for generated results, entropy when unset
    pub seed: Option<u64>,

    /// Reject every training run
    pub simulate_failure: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            dataset_delay_ms: 500,
            gpu_delay_ms: 700,
            training_delay_ms: 3000,
            seed: None,
            simulate_failure: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("spark-config-{}-{}", uuid::Uuid::new_v4(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let path = write_temp("config.json", r#"{"log_level":"debug","backend":{"seed":9}}"#);
        let config = SparkConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.progress_tick_ms, 250);
        assert_eq!(config.backend.seed, Some(9));
        assert_eq!(config.backend.training_delay_ms, 3000);
    }

    #[test]
    fn test_toml_by_extension() {
        let path = write_temp(
            "config.toml",
            "export_dir = \"out\"\n\n[backend]\ntraining_delay_ms = 0\nsimulate_failure = true\n",
        );
        let config = SparkConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.export_dir, "out");
        assert_eq!(config.backend.training_delay_ms, 0);
        assert!(config.backend.simulate_failure);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("spark-config-does-not-exist.json");
        assert!(SparkConfig::load_from_file(&missing).is_err());
    }
}
