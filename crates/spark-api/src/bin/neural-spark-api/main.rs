use clap::Parser;
use spark::{MockBackend, SessionOptions, WizardSession};
use spark_api::{ApiConfig, AppState, build_router};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Neural Spark API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to [default: 127.0.0.1]
    #[arg(short = 'H', long, env = "SPARK_HOST")]
    host: Option<String>,

    /// Port to listen on [default: 3000]
    #[arg(short, long, env = "SPARK_PORT")]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "SPARK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Config file path
    #[arg(short, long, env = "SPARK_CONFIG")]
    config_file: Option<PathBuf>,

    /// Disable Swagger UI
    #[arg(long, env = "SPARK_DISABLE_SWAGGER", default_value_t = false)]
    disable_swagger: bool,

    /// Seed for generated results
    #[arg(long, env = "SPARK_SEED")]
    seed: Option<u64>,

    /// Make every training run fail
    #[arg(long, env = "SPARK_SIMULATE_FAILURE", default_value_t = false)]
    simulate_failure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; failures are reported once logging is up
    let (mut config, load_error) = match &cli.config_file {
        Some(config_path) => match ApiConfig::load_from_file(config_path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (ApiConfig::default(), Some(e)),
        },
        None => (ApiConfig::default(), None),
    };

    // Override with CLI options
    apply_overrides(&mut config, cli.host, cli.port);
    if let Some(level) = cli.log_level {
        config.spark.log_level = level;
    }
    config.enable_swagger = !cli.disable_swagger;
    if cli.seed.is_some() {
        config.spark.backend.seed = cli.seed;
    }
    if cli.simulate_failure {
        config.spark.backend.simulate_failure = true;
    }

    // Initialize logging
    let filter = format!(
        "spark_api={level},spark={level},spark_core={level},tower_http=debug",
        level = config.spark.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match (&cli.config_file, load_error) {
        (Some(path), None) => info!("Configuration loaded from: {}", path.display()),
        (_, Some(e)) => warn!("Failed to load config file: {}. Using default configuration.", e),
        (None, None) => {}
    }

    let addr = config.socket_addr()?;

    // Initialize backend and wizard session
    let backend = Arc::new(MockBackend::from_config(&config.spark.backend));
    let session = WizardSession::with_options(backend, SessionOptions::from_config(&config.spark));
    let state = AppState::new(session);
    debug!(backend = ?config.spark.backend, "Mock backend configured");

    // Build application
    let app = build_router(state, &config);

    // Start server
    info!("Starting server on: {}", addr);
    if config.enable_swagger {
        info!("Swagger UI: http://{}/swagger-ui", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Flags override the config file only when given
fn apply_overrides(config: &mut ApiConfig, host: Option<String>, port: Option<u16>) {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
}
