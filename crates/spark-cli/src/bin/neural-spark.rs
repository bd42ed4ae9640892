//! CLI for the Neural Spark training wizard

use clap::Parser;
use spark_cli::commands::{self, TrainOptions};
use spark_cli::error::CliError;
use spark_cli::{build_session, load_config, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neural-spark")]
#[command(about = "Configure and launch (simulated) model training jobs", long_about = None)]
struct Cli {
    /// Config file path (JSON, or TOML by extension)
    #[arg(long, short = 'c', global = true, env = "SPARK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, short = 'l', global = true, env = "SPARK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Seed for generated results
    #[arg(long, global = true, env = "SPARK_SEED")]
    seed: Option<u64>,

    /// Make every training run fail
    #[arg(long, global = true)]
    simulate_failure: bool,

    /// Skip simulated backend latency
    #[arg(long, global = true)]
    fast: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List trainable models
    Models,
    /// List hosted datasets
    Datasets,
    /// List GPU offers
    Gpus,
    /// Run through the wizard from flags
    Train(TrainOptions),
    /// Interactive wizard prompt
    Wizard,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.seed.is_some() {
        config.backend.seed = cli.seed;
    }
    if cli.simulate_failure {
        config.backend.simulate_failure = true;
    }
    if cli.fast {
        config.backend.dataset_delay_ms = 0;
        config.backend.gpu_delay_ms = 0;
        config.backend.training_delay_ms = 0;
    }
    logging::init_tracing(&config.log_level);

    let mut session = build_session(&config);
    let export_dir = PathBuf::from(&config.export_dir);

    match cli.command {
        Some(Commands::Models) => commands::run_models().await?,
        Some(Commands::Datasets) => commands::run_datasets(&session).await?,
        Some(Commands::Gpus) => commands::run_gpus(&session).await?,
        Some(Commands::Train(options)) => {
            commands::run_train(&mut session, options, &export_dir).await?
        }
        Some(Commands::Wizard) | None => commands::run_wizard(&mut session, &export_dir).await?,
    }

    Ok(())
}
