use serde::{Deserialize, Serialize};
use spark::SparkConfig;
use std::net::SocketAddr;
use std::path::Path;

/// Server settings plus the wizard settings under `spark`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
    /// Serve `/swagger-ui` and `/api-docs/openapi.json`
    pub enable_swagger: bool,
    /// Session, backend and logging settings shared with the CLI
    pub spark: SparkConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: CorsConfig::default(),
            enable_swagger: true,
            spark: SparkConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }

    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }
}

/// Origins allowed to drive the wizard from a browser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty allows any origin
    pub origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);

        let bad = ApiConfig {
            host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_nested_spark_config_defaults() {
        let config: ApiConfig = serde_json::from_str(
            r#"{"port":8080,"spark":{"backend":{"training_delay_ms":10}}}"#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.cors.allows_any());
        assert_eq!(config.spark.backend.training_delay_ms, 10);
        assert_eq!(config.spark.progress_tick_ms, 250);
        assert_eq!(config.spark.log_level, "info");
    }

    #[test]
    fn test_restricted_origins() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"cors":{"origins":["http://localhost:5173"]}}"#).unwrap();
        assert!(!config.cors.allows_any());
        assert!(config.enable_swagger);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ApiConfig::load_from_file(Path::new("/nonexistent/spark-api.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
