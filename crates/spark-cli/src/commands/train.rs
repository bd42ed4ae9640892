//! Scripted run through the wizard

use crate::error::{CliError, Result};
use crate::progress::{create_spinner, create_training_bar};
use spark::{
    LocalStorage, ResultsExporter, Resolution, TrainingConfigPatch, TrainingResults,
    TrainingStatus, UploadedFile, WizardSession, WizardStep,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Flags of the `train` command
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TrainOptions {
    /// Model to train (e.g. "BERT", "gpt2", "Stable Diffusion")
    #[arg(long, short = 'm')]
    pub model: String,

    /// Hosted dataset id or name
    #[arg(long, short = 'd', conflicts_with = "upload")]
    pub dataset: Option<String>,

    /// Local dataset file to attach instead of a hosted dataset
    #[arg(long, short = 'u')]
    pub upload: Option<PathBuf>,

    #[arg(long)]
    pub batch_size: Option<u32>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long, short = 'e')]
    pub epochs: Option<u32>,

    /// Fraction of data held out, in [0, 1]
    #[arg(long)]
    pub validation_split: Option<f64>,

    /// Generation prompt (GPT-2 and Stable Diffusion)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Output resolution, e.g. 512x512 (GPT-2 and Stable Diffusion)
    #[arg(long)]
    pub resolution: Option<String>,

    /// Generation seed (GPT-2 and Stable Diffusion)
    #[arg(long)]
    pub generation_seed: Option<u64>,

    /// GPU id or name, shown with its estimated cost
    #[arg(long, short = 'g')]
    pub gpu: Option<String>,

    /// Directory training-results.json is written into
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl TrainOptions {
    /// Hyperparameter patch from the flags
    pub fn config_patch(&self, generative: bool) -> Result<TrainingConfigPatch> {
        let mut patch = TrainingConfigPatch::new();
        if let Some(v) = self.batch_size {
            patch = patch.batch_size(v);
        }
        if let Some(v) = self.learning_rate {
            patch = patch.learning_rate(v);
        }
        if let Some(v) = self.epochs {
            patch = patch.epochs(v);
        }
        if let Some(v) = self.validation_split {
            patch = patch.validation_split(v);
        }

        let generation_flags =
            self.prompt.is_some() || self.resolution.is_some() || self.generation_seed.is_some();
        if generation_flags && !generative {
            warn!("Prompt, resolution and seed only apply to generative models, ignoring");
            return Ok(patch);
        }
        if let Some(prompt) = &self.prompt {
            patch = patch.prompt(Some(prompt.clone()));
        }
        if let Some(raw) = &self.resolution {
            let resolution = Resolution::from_str(raw)
                .map_err(|_| spark::CoreError::UnknownResolution(raw.clone()))?;
            patch = patch.resolution(resolution);
        }
        if let Some(seed) = self.generation_seed {
            patch = patch.seed(seed);
        }
        Ok(patch)
    }
}

pub async fn run_train(
    session: &mut WizardSession,
    options: TrainOptions,
    default_output: &Path,
) -> Result<()> {
    println!("⚡ Neural Spark training launcher");
    println!("================================");

    // Step 1: model
    let model = session
        .select_model_by_name(&options.model)?
        .selected_model
        .ok_or_else(|| CliError::InvalidInput("model selection failed".to_string()))?;
    println!("🧠 Model: {}", model.display_name());

    // Step 2: dataset
    match (&options.dataset, &options.upload) {
        (Some(id), _) => {
            let spinner = create_spinner("Loading datasets...");
            let selected = session.select_dataset_by_id(id).await;
            spinner.finish_and_clear();
            println!("📚 Dataset: {}", selected?.dataset_label());
        }
        (None, Some(path)) => {
            let file = uploaded_file(path).await?;
            println!("📁 Upload: {} ({})", file.name, file.size_label());
            session.upload_file(file)?;
        }
        (None, None) => {
            return Err(CliError::InvalidInput(
                "either --dataset or --upload is required".to_string(),
            ));
        }
    }

    // Step 3: configuration
    let patch = options.config_patch(model.is_generative())?;
    let config = &session.update_config(patch)?.config;
    println!(
        "⚙️  batch={} lr={} epochs={} split={}",
        display_opt(config.batch_size),
        display_opt(config.learning_rate),
        display_opt(config.epochs),
        display_opt(config.validation_split)
    );
    session.go_next();

    // Step 4: GPU and training
    if let Some(gpu) = &options.gpu {
        let gpu = session.select_gpu_by_id(gpu).await?;
        println!(
            "🖥️  GPU: {} · est. {} · ${:.2}",
            gpu.name,
            gpu.estimated_time,
            gpu.estimated_cost()
        );
    }
    if session.current_step() != WizardStep::StartTraining {
        return Err(CliError::InvalidInput(format!(
            "wizard stopped at {}",
            session.current_step()
        )));
    }

    let status = train_with_progress(session).await?;
    if status != TrainingStatus::Complete {
        println!("❌ Training failed. Run again to retry.");
        return Err(CliError::TrainingFailed);
    }

    // Step 5: results
    let results = session.results()?;
    print_results(results);

    let output = options.output.unwrap_or_else(|| default_output.to_path_buf());
    let exporter = ResultsExporter::new(Arc::new(LocalStorage::new(&output)));
    let path = exporter.export(results).await?;
    println!("💾 Saved {}", output.join(path).display());

    Ok(())
}

/// Run training while a progress bar follows the session meter
pub(crate) async fn train_with_progress(session: &mut WizardSession) -> Result<TrainingStatus> {
    let pb = create_training_bar("🚀 Training...");
    let mut rx = session.subscribe_progress();
    let bar = pb.clone();
    let follower = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let percent = rx.borrow_and_update().percent();
            bar.set_position(u64::from(percent));
        }
    });

    let outcome = session.start_training().await;
    follower.abort();

    let status = outcome?.training_status;
    pb.set_position(u64::from(session.progress().percent()));
    if status == TrainingStatus::Complete {
        pb.finish_with_message("✅ Training complete");
    } else {
        pb.abandon_with_message("❌ Training failed");
    }
    Ok(status)
}

pub(crate) fn print_results(results: &TrainingResults) {
    println!("\n📊 Results");
    println!("─────────────────────────────────────────");
    println!("Model:     {}", results.model_name);
    println!("Dataset:   {}", results.dataset_name);
    println!("Time:      {}", results.training_time);
    println!("Accuracy:  {:.2}%", results.accuracy * 100.0);
    println!("Loss:      {:.4}", results.loss);
    println!("Reward:    {:.6}", results.reward_earned);
    for stat in &results.epoch_stats {
        println!(
            "  epoch {:>3}  loss {:.4}  acc {:.2}%",
            stat.epoch,
            stat.loss,
            stat.accuracy * 100.0
        );
    }
    if let Some(samples) = &results.output_samples {
        println!("Samples:");
        for url in samples {
            println!("  🖼️  {}", url);
        }
    }
    println!("Model URL: {}", results.model_url);
}

/// Metadata of a local dataset file
pub(crate) async fn uploaded_file(path: &Path) -> Result<UploadedFile> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(CliError::InvalidInput(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedFile::new(name, metadata.len()))
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark::{MockBackend, ModelId, SessionOptions};
    use std::time::Duration;

    fn session() -> WizardSession {
        WizardSession::with_options(
            Arc::new(MockBackend::new().without_delays().with_seed(4)),
            SessionOptions {
                tick_interval: Duration::from_millis(10),
                ticker_seed: Some(4),
            },
        )
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("spark-cli-{}", std::process::id()))
    }

    #[test]
    fn test_generation_flags_ignored_for_classifiers() {
        let options = TrainOptions {
            model: "bert".to_string(),
            epochs: Some(3),
            prompt: Some("hello".to_string()),
            ..Default::default()
        };
        let patch = options.config_patch(false).unwrap();
        assert!(!patch.touches_generation_params());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_unknown_resolution_rejected() {
        let options = TrainOptions {
            model: "sd".to_string(),
            resolution: Some("300x300".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            options.config_patch(true),
            Err(CliError::Core(spark::CoreError::UnknownResolution(_)))
        ));
    }

    #[tokio::test]
    async fn test_scripted_run_writes_results() {
        let output = temp_dir().join("scripted");
        let mut session = session();
        let options = TrainOptions {
            model: "GPT-2".to_string(),
            dataset: Some("MNIST".to_string()),
            epochs: Some(4),
            generation_seed: Some(8),
            gpu: Some("V100".to_string()),
            output: Some(output.clone()),
            ..Default::default()
        };

        run_train(&mut session, options, Path::new(".")).await.unwrap();

        assert_eq!(session.state().selected_model, Some(ModelId::Gpt2));
        assert_eq!(session.state().config.seed, Some(8));
        let body = std::fs::read_to_string(output.join(spark::RESULTS_FILE_NAME)).unwrap();
        let results: TrainingResults = serde_json::from_str(&body).unwrap();
        assert_eq!(results.epoch_stats.len(), 4);
        std::fs::remove_dir_all(&output).ok();
    }

    #[tokio::test]
    async fn test_upload_with_unsupported_extension_is_rejected() {
        let dir = temp_dir().join("upload");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut session = session();
        let options = TrainOptions {
            model: "BERT".to_string(),
            upload: Some(path),
            ..Default::default()
        };
        let err = run_train(&mut session, options, Path::new(".")).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Spark(spark::SparkError::Core(spark::CoreError::UnsupportedFileType(_)))
        ));
        assert!(session.state().uploaded_file.is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_dataset_is_rejected() {
        let mut session = session();
        let options = TrainOptions {
            model: "Whisper".to_string(),
            ..Default::default()
        };
        let err = run_train(&mut session, options, Path::new(".")).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_failed_run_reports_training_failed() {
        let mut session = WizardSession::new(Arc::new(
            MockBackend::new().without_delays().with_failing_training(true),
        ));
        let options = TrainOptions {
            model: "Llama2".to_string(),
            dataset: Some("1".to_string()),
            ..Default::default()
        };
        let err = run_train(&mut session, options, Path::new(".")).await.unwrap_err();
        assert!(matches!(err, CliError::TrainingFailed));
        assert_eq!(session.state().training_status, TrainingStatus::Error);
    }
}
