use super::catalog::{self, MODEL_URL, SAMPLE_IMAGE_URLS};
use super::{BackendError, Result, TrainingBackend, TrainingRequest};
use crate::config::BackendConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spark_core::config::DEFAULT_EPOCHS;
use spark_core::{Dataset, EpochStat, Gpu, ModelId, TrainingResults};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Simulated latency of each facade call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelays {
    pub list_datasets: Duration,
    pub list_gpus: Duration,
    pub run_training: Duration,
}

impl Default for MockDelays {
    fn default() -> Self {
        Self {
            list_datasets: Duration::from_millis(500),
            list_gpus: Duration::from_millis(700),
            run_training: Duration::from_millis(3000),
        }
    }
}

impl MockDelays {
    pub fn none() -> Self {
        Self {
            list_datasets: Duration::ZERO,
            list_gpus: Duration::ZERO,
            run_training: Duration::ZERO,
        }
    }
}

/// Backend answering from canned data after fixed delays
pub struct MockBackend {
    delays: MockDelays,
    rng: Mutex<StdRng>,
    fail_training: AtomicBool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            delays: MockDelays::default(),
            rng: Mutex::new(StdRng::from_entropy()),
            fail_training: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let backend = Self::new()
            .with_delays(MockDelays {
                list_datasets: Duration::from_millis(config.dataset_delay_ms),
                list_gpus: Duration::from_millis(config.gpu_delay_ms),
                run_training: Duration::from_millis(config.training_delay_ms),
            })
            .with_failing_training(config.simulate_failure);
        match config.seed {
            Some(seed) => backend.with_seed(seed),
            None => backend,
        }
    }

    /// Deterministic results for a given seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_delays(mut self, delays: MockDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn without_delays(self) -> Self {
        self.with_delays(MockDelays::none())
    }

    pub fn with_failing_training(self, fail: bool) -> Self {
        self.set_fail_training(fail);
        self
    }

    /// Make subsequent runs reject (or succeed again)
    pub fn set_fail_training(&self, fail: bool) {
        self.fail_training.store(fail, Ordering::SeqCst);
    }

    pub fn delays(&self) -> MockDelays {
        self.delays
    }

    fn generate(&self, request: &TrainingRequest) -> TrainingResults {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generate_results(request, &mut *rng)
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl TrainingBackend for MockBackend {
    async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        simulate_latency(self.delays.list_datasets).await;
        Ok(catalog::datasets())
    }

    async fn list_gpus(&self) -> Result<Vec<Gpu>> {
        simulate_latency(self.delays.list_gpus).await;
        Ok(catalog::gpus())
    }

    async fn run_training(&self, request: &TrainingRequest) -> Result<TrainingResults> {
        debug!(model = ?request.model, epochs = ?request.config.epochs, "Mock training started");
        simulate_latency(self.delays.run_training).await;

        if self.fail_training.load(Ordering::SeqCst) {
            warn!("Mock training configured to fail");
            return Err(BackendError::Rejected("simulated training failure".to_string()));
        }

        let results = self.generate(request);
        info!(
            model = %results.model_name,
            dataset = %results.dataset_name,
            accuracy = results.accuracy,
            "Mock training finished"
        );
        Ok(results)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Per-epoch curves: loss decays from 4 toward 1, accuracy rises from 0.5 toward 0.9
pub fn epoch_stats(epochs: u32) -> Vec<EpochStat> {
    let total = f64::from(epochs);
    (1..=epochs)
        .map(|epoch| {
            let i = f64::from(epoch);
            EpochStat {
                epoch,
                loss: 4.0 - 3.0 * (1.0 - (-i / (total / 3.0)).exp()),
                accuracy: 0.5 + 0.4 * (1.0 - (-i / (total / 2.0)).exp()),
            }
        })
        .collect()
}

/// Build the outcome of a run from the request snapshot
pub fn generate_results<R: Rng>(request: &TrainingRequest, rng: &mut R) -> TrainingResults {
    let epochs = request
        .config
        .epochs
        .filter(|&e| e > 0)
        .unwrap_or(DEFAULT_EPOCHS);
    let epoch_stats = epoch_stats(epochs);
    let (accuracy, loss) = epoch_stats
        .last()
        .map(|s| (s.accuracy, s.loss))
        .unwrap_or_default();

    let output_samples = (request.model == Some(ModelId::StableDiffusion))
        .then(|| SAMPLE_IMAGE_URLS.iter().map(|url| url.to_string()).collect());

    let hours = rng.gen_range(1..=3);
    let minutes = rng.gen_range(0..60);
    let reward: f64 = rng.gen_range(0.0..0.01);

    TrainingResults {
        model_name: request
            .model
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        dataset_name: request
            .dataset
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| "Custom Dataset".to_string()),
        training_time: format!("{hours}h {minutes}m"),
        accuracy,
        loss,
        epoch_stats,
        output_samples,
        model_url: MODEL_URL.to_string(),
        reward_earned: (reward * 1_000_000.0).round() / 1_000_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_core::{TrainingConfig, UploadedFile};

    fn request(model: Option<ModelId>, epochs: Option<u32>) -> TrainingRequest {
        TrainingRequest {
            model,
            dataset: catalog::datasets().into_iter().next(),
            uploaded_file: None,
            config: TrainingConfig {
                epochs,
                ..TrainingConfig::default()
            },
        }
    }

    #[test]
    fn test_ten_epochs_produce_converging_curves() {
        let mut rng = StdRng::seed_from_u64(7);
        let results = generate_results(&request(Some(ModelId::Bert), Some(10)), &mut rng);

        let epochs: Vec<u32> = results.epoch_stats.iter().map(|s| s.epoch).collect();
        assert_eq!(epochs, (1..=10).collect::<Vec<_>>());
        assert!(results.accuracy > 0.5 && results.accuracy < 0.9);
        assert!(results.loss > 1.0 && results.loss < 4.0);
        assert_eq!(results.final_epoch().map(|s| s.accuracy), Some(results.accuracy));
        assert_eq!(results.model_name, "BERT");
        assert_eq!(results.dataset_name, "Common Crawl");
        assert_eq!(results.model_url, MODEL_URL);
    }

    #[test]
    fn test_missing_or_zero_epochs_default_to_ten() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_results(&request(None, None), &mut rng).epoch_stats.len(), 10);
        assert_eq!(generate_results(&request(None, Some(0)), &mut rng).epoch_stats.len(), 10);
        assert_eq!(generate_results(&request(None, Some(3)), &mut rng).epoch_stats.len(), 3);
    }

    #[test]
    fn test_samples_only_for_stable_diffusion() {
        let mut rng = StdRng::seed_from_u64(3);
        let sd = generate_results(&request(Some(ModelId::StableDiffusion), None), &mut rng);
        assert_eq!(sd.output_samples.as_ref().map(Vec::len), Some(2));

        let llama = generate_results(&request(Some(ModelId::Llama2), None), &mut rng);
        assert!(llama.output_samples.is_none());
    }

    #[test]
    fn test_fallback_names() {
        let mut rng = StdRng::seed_from_u64(5);
        let request = TrainingRequest {
            model: None,
            dataset: None,
            uploaded_file: Some(UploadedFile::new("mine.csv", 12)),
            config: TrainingConfig::default(),
        };
        let results = generate_results(&request, &mut rng);
        assert_eq!(results.model_name, "Unknown");
        assert_eq!(results.dataset_name, "Custom Dataset");
    }

    #[test]
    fn test_random_fields_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let results = generate_results(&request(Some(ModelId::Gpt2), None), &mut rng);
            assert!(results.reward_earned >= 0.0 && results.reward_earned <= 0.01);
            let scaled = results.reward_earned * 1_000_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);

            let (hours, minutes) = results
                .training_time
                .split_once("h ")
                .and_then(|(h, m)| Some((h.parse::<u32>().ok()?, m.strip_suffix('m')?.parse::<u32>().ok()?)))
                .expect("training time label");
            assert!((1..=3).contains(&hours));
            assert!(minutes < 60);
        }
    }

    #[test]
    fn test_same_seed_same_results() {
        let a = generate_results(&request(Some(ModelId::Roberta), None), &mut StdRng::seed_from_u64(42));
        let b = generate_results(&request(Some(ModelId::Roberta), None), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_calls_wait_for_their_delay() {
        let backend = MockBackend::new();
        let started = tokio::time::Instant::now();
        let datasets = backend.list_datasets().await.unwrap();
        assert_eq!(datasets.len(), 5);
        assert!(started.elapsed() >= Duration::from_millis(500));

        let gpus = backend.list_gpus().await.unwrap();
        assert_eq!(gpus.len(), 5);
        assert!(started.elapsed() >= Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_failing_mode_rejects_until_cleared() {
        let backend = MockBackend::new().without_delays().with_failing_training(true);
        let req = request(Some(ModelId::Bert), Some(2));

        let err = backend.run_training(&req).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected(_)));

        backend.set_fail_training(false);
        let results = backend.run_training(&req).await.unwrap();
        assert_eq!(results.epoch_stats.len(), 2);
    }
}
