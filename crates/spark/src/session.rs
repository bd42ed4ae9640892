//! Wizard session
//!
//! Couples the [`WizardStore`] with the [`StepController`], the training
//! backend and the progress ticker. Presentation layers (CLI, HTTP) drive the
//! wizard exclusively through this type.

use crate::backend::{BackendError, SharedBackend, TrainingRequest};
use crate::config::SparkConfig;
use crate::error::{Result, SparkError};
use crate::ticker::ProgressTicker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spark_core::{
    Dataset, Gpu, ModelId, NavigationBar, ProgressMeter, StepController, StepIndicator,
    TrainingConfigPatch, TrainingResults, TrainingStatus, UploadedFile, WizardState, WizardStep,
    WizardStore,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Session tuning
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Interval between progress ticks while training
    pub tick_interval: Duration,
    /// Base seed for tick increments, entropy when unset. Each run mixes in
    /// its ordinal so consecutive runs draw different curves.
    pub ticker_seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
            ticker_seed: None,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &SparkConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.progress_tick_ms),
            ticker_seed: config.backend.seed,
        }
    }
}

/// NewType pattern for training run ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a started run, passed back when the backend settles
#[derive(Debug, Clone, PartialEq)]
pub struct RunTicket {
    pub id: RunId,
    pub request: TrainingRequest,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct ActiveRun {
    ticket: RunTicket,
    // Aborted on drop
    _ticker: ProgressTicker,
}

pub struct WizardSession {
    store: WizardStore,
    steps: StepController,
    backend: SharedBackend,
    options: SessionOptions,
    progress: Arc<watch::Sender<ProgressMeter>>,
    selected_gpu: Option<Gpu>,
    active_run: Option<ActiveRun>,
    runs_started: u64,
}

impl WizardSession {
    pub fn new(backend: SharedBackend) -> Self {
        Self::with_options(backend, SessionOptions::default())
    }

    pub fn with_options(backend: SharedBackend, options: SessionOptions) -> Self {
        let (progress, _) = watch::channel(ProgressMeter::new());
        Self {
            store: WizardStore::new(),
            steps: StepController::new(),
            backend,
            options,
            progress: Arc::new(progress),
            selected_gpu: None,
            active_run: None,
            runs_started: 0,
        }
    }

    pub fn backend(&self) -> SharedBackend {
        Arc::clone(&self.backend)
    }

    pub fn state(&self) -> &WizardState {
        self.store.state()
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn current_step(&self) -> WizardStep {
        self.steps.current()
    }

    pub fn max_allowed_step(&self) -> WizardStep {
        self.steps.max_allowed(self.store.state())
    }

    pub fn navigation(&self) -> NavigationBar {
        self.steps.navigation()
    }

    pub fn stepper(&self) -> Vec<StepIndicator> {
        self.steps.stepper(self.store.state())
    }

    pub fn progress_fraction(&self) -> f64 {
        self.steps.progress_fraction()
    }

    // Selection

    /// Select a model and move on when picked from the model step
    pub fn select_model(&mut self, model: ModelId) -> &WizardState {
        self.store.set_model(model);
        self.advance_from(WizardStep::SelectModel);
        self.store.state()
    }

    pub fn select_model_by_name(&mut self, name: &str) -> Result<&WizardState> {
        let model = ModelId::parse(name)?;
        Ok(self.select_model(model))
    }

    pub fn select_dataset(&mut self, dataset: Dataset) -> &WizardState {
        self.store.set_dataset(dataset);
        self.advance_from(WizardStep::ChooseDataset);
        self.store.state()
    }

    /// Look the dataset up in the backend catalog, then select it
    pub async fn select_dataset_by_id(&mut self, id: &str) -> Result<&WizardState> {
        let datasets = self.backend.list_datasets().await?;
        let dataset = find_dataset(datasets, id)?;
        Ok(self.select_dataset(dataset))
    }

    /// Attach a `.csv`, `.json` or `.zip` file of at most 10GB
    pub fn upload_file(&mut self, file: UploadedFile) -> Result<&WizardState> {
        file.validate()?;
        info!(file = %file.name, size = file.size_bytes, "Dataset file attached");
        self.store.set_uploaded_file(file);
        self.advance_from(WizardStep::ChooseDataset);
        Ok(self.store.state())
    }

    fn advance_from(&mut self, step: WizardStep) {
        if self.steps.current() == step {
            self.steps.advance();
        }
    }

    // Configuration

    pub fn update_config(&mut self, patch: TrainingConfigPatch) -> Result<&WizardState> {
        patch.validate()?;
        Ok(self.store.update_config(patch))
    }

    /// Apply one textual `field=value` edit
    pub fn set_config_field(&mut self, field: &str, raw: &str) -> Result<&WizardState> {
        let mut patch = TrainingConfigPatch::new();
        patch.assign(field, raw)?;
        self.update_config(patch)
    }

    /// Clear every hyperparameter
    pub fn clear_config(&mut self) -> &WizardState {
        self.store.update_config(TrainingConfigPatch::clear_all())
    }

    // Navigation

    /// Next button. Ignored where the navigation bar hides or disables it.
    pub fn go_next(&mut self) -> WizardStep {
        let nav = self.steps.navigation();
        if nav.show_next && nav.next_enabled {
            self.steps.advance();
        }
        self.steps.current()
    }

    /// Back button. Ignored where the navigation bar hides it.
    pub fn go_back(&mut self) -> WizardStep {
        if self.steps.navigation().show_back {
            self.steps.retreat();
        }
        self.steps.current()
    }

    /// Stepper click. Returns whether the jump was taken.
    pub fn click_step(&mut self, index: usize) -> Result<bool> {
        let target = WizardStep::from_index(index)?;
        Ok(self.steps.jump_to(target, self.store.state()))
    }

    // Catalogs and GPU

    pub async fn available_datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self.backend.list_datasets().await?)
    }

    pub async fn available_gpus(&self) -> Result<Vec<Gpu>> {
        Ok(self.backend.list_gpus().await?)
    }

    pub fn selected_gpu(&self) -> Option<&Gpu> {
        self.selected_gpu.as_ref()
    }

    /// Pick a GPU for display. Unavailable GPUs cannot be chosen.
    pub fn select_gpu(&mut self, gpu: Gpu) -> Result<&Gpu> {
        if !gpu.available {
            return Err(SparkError::GpuUnavailable(gpu.name));
        }
        info!(gpu = %gpu.name, cost = gpu.estimated_cost(), "GPU selected");
        Ok(self.selected_gpu.insert(gpu))
    }

    pub async fn select_gpu_by_id(&mut self, id: &str) -> Result<&Gpu> {
        let gpus = self.backend.list_gpus().await?;
        let gpu = find_gpu(gpus, id)?;
        self.select_gpu(gpu)
    }

    /// Estimated cost of the selected GPU in dollars
    pub fn estimated_cost(&self) -> Option<f64> {
        self.selected_gpu.as_ref().map(Gpu::estimated_cost)
    }

    // Training

    pub fn is_training(&self) -> bool {
        self.active_run.is_some()
    }

    pub fn active_run(&self) -> Option<&RunTicket> {
        self.active_run.as_ref().map(|run| &run.ticket)
    }

    /// Preconditions of the start button
    pub fn ensure_can_start(&self) -> Result<()> {
        let current = self.steps.current();
        if current != WizardStep::StartTraining {
            return Err(SparkError::NotOnTrainingStep(current));
        }
        let state = self.store.state();
        if state.selected_model.is_none() {
            return Err(SparkError::ModelRequired);
        }
        if !state.has_dataset() {
            return Err(SparkError::DatasetRequired);
        }
        if self.active_run.is_some() {
            return Err(SparkError::TrainingInProgress);
        }
        Ok(())
    }

    pub fn can_start_training(&self) -> bool {
        self.ensure_can_start().is_ok()
    }

    /// Mark the run as training and start the progress ticker.
    ///
    /// Must be called within a tokio runtime. The caller awaits
    /// [`TrainingBackend::run_training`](crate::backend::TrainingBackend::run_training)
    /// with the ticket's request and hands the outcome to
    /// [`finish_training`](Self::finish_training).
    pub fn begin_training(&mut self) -> Result<RunTicket> {
        self.ensure_can_start()?;

        let ticket = RunTicket {
            id: RunId::new(),
            request: TrainingRequest::from(self.store.state()),
            started_at: Utc::now(),
        };
        self.store.set_training_status(TrainingStatus::Training);
        self.progress.send_modify(ProgressMeter::reset);

        let ticker = ProgressTicker::spawn(
            Arc::clone(&self.progress),
            self.options.tick_interval,
            self.run_ticker_seed(),
        );
        self.runs_started += 1;
        info!(
            run_id = %ticket.id,
            model = ?ticket.request.model,
            dataset = %self.store.state().dataset_label(),
            "Training started"
        );
        self.active_run = Some(ActiveRun {
            ticket: ticket.clone(),
            _ticker: ticker,
        });
        Ok(ticket)
    }

    /// Seed of the ticker for the next run
    fn run_ticker_seed(&self) -> Option<u64> {
        self.options.ticker_seed.map(|seed| {
            seed.wrapping_add(self.runs_started.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        })
    }

    /// Apply the backend outcome of a run.
    ///
    /// The outcome of a run that is no longer active (reset in between) is
    /// logged and dropped.
    pub fn finish_training(
        &mut self,
        run_id: RunId,
        outcome: std::result::Result<TrainingResults, BackendError>,
    ) -> &WizardState {
        let is_active = self
            .active_run
            .as_ref()
            .is_some_and(|run| run.ticket.id == run_id);
        if !is_active {
            warn!(
                run_id = %run_id,
                succeeded = outcome.is_ok(),
                "Dropping outcome of a run that is no longer active"
            );
            return self.store.state();
        }
        // Dropping the run aborts its ticker
        self.active_run = None;

        match outcome {
            Ok(results) => {
                info!(run_id = %run_id, accuracy = results.accuracy, loss = results.loss, "Training complete");
                self.store.complete_training(results);
                self.progress.send_modify(ProgressMeter::complete);
                self.steps.show_results();
            }
            Err(e) => {
                error!(run_id = %run_id, error = %e, "Error during training");
                self.store.set_training_status(TrainingStatus::Error);
            }
        }
        self.store.state()
    }

    /// Begin, await the backend and settle in one call
    pub async fn start_training(&mut self) -> Result<&WizardState> {
        let ticket = self.begin_training()?;
        let outcome = self.backend.run_training(&ticket.request).await;
        Ok(self.finish_training(ticket.id, outcome))
    }

    pub fn progress(&self) -> ProgressMeter {
        *self.progress.borrow()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressMeter> {
        self.progress.subscribe()
    }

    // Results

    pub fn results(&self) -> Result<&TrainingResults> {
        self.store
            .state()
            .training_results
            .as_ref()
            .ok_or(SparkError::NoResults)
    }

    /// Indented JSON body of `training-results.json`
    pub fn export_results_json(&self) -> Result<String> {
        Ok(self.results()?.to_json_pretty()?)
    }

    /// Start over: initial state, first step, no GPU, no active run
    pub fn reset(&mut self) -> &WizardState {
        if let Some(run) = self.active_run.take() {
            warn!(run_id = %run.ticket.id, "Reset while training, run detached");
        }
        self.steps.reset();
        self.selected_gpu = None;
        self.progress.send_modify(ProgressMeter::reset);
        self.store.reset()
    }
}

/// Match a catalog dataset by id or case-insensitive name
pub fn find_dataset(datasets: Vec<Dataset>, id: &str) -> Result<Dataset> {
    datasets
        .into_iter()
        .find(|d| d.id.as_str() == id || d.name.eq_ignore_ascii_case(id))
        .ok_or_else(|| SparkError::UnknownDataset(id.to_string()))
}

/// Match a catalog GPU by id or case-insensitive name
pub fn find_gpu(gpus: Vec<Gpu>, id: &str) -> Result<Gpu> {
    gpus.into_iter()
        .find(|g| g.id == id || g.name.eq_ignore_ascii_case(id))
        .ok_or_else(|| SparkError::UnknownGpu(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockBackend, catalog};
    use spark_core::StepState;

    fn mock() -> Arc<MockBackend> {
        Arc::new(MockBackend::new().without_delays().with_seed(17))
    }

    fn session_with(backend: Arc<MockBackend>) -> WizardSession {
        WizardSession::with_options(
            backend,
            SessionOptions {
                tick_interval: Duration::from_millis(250),
                ticker_seed: Some(3),
            },
        )
    }

    fn wikipedia() -> Dataset {
        catalog::datasets()
            .into_iter()
            .find(|d| d.name == "Wikipedia")
            .unwrap()
    }

    async fn at_training_step(model: ModelId) -> WizardSession {
        let mut session = session_with(mock());
        session.select_model(model);
        session.select_dataset_by_id("5").await.unwrap();
        assert_eq!(session.go_next(), WizardStep::StartTraining);
        session
    }

    #[test]
    fn test_bert_selection_gates_later_steps() {
        let mut session = session_with(mock());
        session.select_model(ModelId::Bert);

        assert_eq!(session.current_step(), WizardStep::ChooseDataset);
        assert_eq!(session.max_allowed_step(), WizardStep::ChooseDataset);
        assert!(!session.click_step(3).unwrap());
        assert_eq!(session.current_step(), WizardStep::ChooseDataset);
    }

    #[test]
    fn test_dataset_unlocks_training_step() {
        let mut session = session_with(mock());
        session.select_model(ModelId::Bert);
        session.select_dataset(wikipedia());

        assert_eq!(session.current_step(), WizardStep::Configure);
        assert_eq!(session.max_allowed_step(), WizardStep::StartTraining);
        assert!(session.click_step(3).unwrap());
        assert!(session.click_step(0).unwrap());
        assert!(!session.click_step(2).unwrap());
        assert!(session.click_step(9).is_err());
    }

    #[test]
    fn test_selection_away_from_its_step_does_not_advance() {
        let mut session = session_with(mock());
        session.select_model(ModelId::Gpt2);
        session.upload_file(UploadedFile::new("corpus.csv", 4_096)).unwrap();
        assert_eq!(session.current_step(), WizardStep::Configure);

        session.select_model(ModelId::Llama2);
        assert_eq!(session.current_step(), WizardStep::Configure);
        assert_eq!(session.state().selected_model, Some(ModelId::Llama2));
    }

    #[test]
    fn test_rejected_upload_leaves_wizard_untouched() {
        let mut session = session_with(mock());
        session.select_model(ModelId::Bert);

        assert!(matches!(
            session.upload_file(UploadedFile::new("notes.txt", 100)),
            Err(SparkError::Core(spark_core::CoreError::UnsupportedFileType(_)))
        ));
        assert!(matches!(
            session.upload_file(UploadedFile::new("dump.zip", spark_core::MAX_UPLOAD_BYTES + 1)),
            Err(SparkError::Core(spark_core::CoreError::FileTooLarge { .. }))
        ));
        assert!(session.state().uploaded_file.is_none());
        assert_eq!(session.current_step(), WizardStep::ChooseDataset);
        assert_eq!(session.max_allowed_step(), WizardStep::ChooseDataset);
    }

    #[test]
    fn test_navigation_bar_rules() {
        let mut session = session_with(mock());
        // Hidden on the first step
        assert_eq!(session.go_next(), WizardStep::SelectModel);

        session.select_model(ModelId::Whisper);
        assert_eq!(session.go_back(), WizardStep::SelectModel);
        session.select_model(ModelId::Whisper);
        session.select_dataset(wikipedia());
        assert_eq!(session.go_next(), WizardStep::StartTraining);

        let nav = session.navigation();
        assert!(!nav.next_enabled);
        assert_eq!(nav.next_label, "Training in Progress");
        assert_eq!(session.go_next(), WizardStep::StartTraining);
    }

    #[test]
    fn test_update_config_validates_first() {
        let mut session = session_with(mock());
        let err = session
            .update_config(TrainingConfigPatch::new().validation_split(1.5))
            .unwrap_err();
        assert!(matches!(err, SparkError::Core(_)));
        assert_eq!(session.revision(), 0);

        session.set_config_field("batch_size", "64").unwrap();
        session.set_config_field("seed", "").unwrap();
        assert_eq!(session.state().config.batch_size, Some(64));
        assert!(session.set_config_field("seed", "0").is_err());

        session.clear_config();
        assert_eq!(session.state().config.epochs, None);
    }

    #[tokio::test]
    async fn test_unknown_dataset_and_gpu() {
        let mut session = session_with(mock());
        assert!(matches!(
            session.select_dataset_by_id("42").await,
            Err(SparkError::UnknownDataset(_))
        ));
        assert!(matches!(
            session.select_gpu_by_id("TPU").await,
            Err(SparkError::UnknownGpu(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_gpu_cannot_be_selected() {
        let mut session = session_with(mock());
        assert!(matches!(
            session.select_gpu_by_id("A100").await,
            Err(SparkError::GpuUnavailable(_))
        ));
        assert!(session.selected_gpu().is_none());

        let gpu = session.select_gpu_by_id("rtx 4090").await.unwrap();
        assert_eq!(gpu.id, "1");
        let cost = session.estimated_cost().unwrap();
        assert!((cost - 2.25 * 0.35).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_start_requires_training_step() {
        let mut session = session_with(mock());
        session.select_model(ModelId::Bert);
        assert!(matches!(
            session.start_training().await,
            Err(SparkError::NotOnTrainingStep(WizardStep::ChooseDataset))
        ));
        assert_eq!(session.state().training_status, TrainingStatus::Idle);
    }

    #[tokio::test]
    async fn test_successful_run_shows_results() {
        let mut session = at_training_step(ModelId::StableDiffusion).await;
        let state = session.start_training().await.unwrap();

        assert_eq!(state.training_status, TrainingStatus::Complete);
        let results = state.training_results.clone().unwrap();
        assert_eq!(results.model_name, "Stable Diffusion");
        assert_eq!(results.dataset_name, "Wikipedia");
        assert!(!results.output_samples.unwrap_or_default().is_empty());

        assert_eq!(session.current_step(), WizardStep::ViewResults);
        assert_eq!(session.max_allowed_step(), WizardStep::ViewResults);
        assert_eq!(session.progress().percent(), 100);
        assert!(!session.is_training());

        let stepper = session.stepper();
        assert!(stepper[..4].iter().all(|s| s.state == StepState::Completed));
        assert!(!session.navigation().show_back);
    }

    #[tokio::test]
    async fn test_failed_run_stays_on_training_step_and_retry_succeeds() {
        let backend = Arc::new(
            MockBackend::new()
                .without_delays()
                .with_seed(17)
                .with_failing_training(true),
        );
        let mut session = session_with(Arc::clone(&backend));
        session.select_model(ModelId::Llama2);
        session.upload_file(UploadedFile::new("chat.json", 1_000)).unwrap();
        session.go_next();

        let state = session.start_training().await.unwrap();
        assert_eq!(state.training_status, TrainingStatus::Error);
        assert!(state.training_results.is_none());
        assert_eq!(session.current_step(), WizardStep::StartTraining);
        assert!(!session.is_training());
        assert!(matches!(session.results(), Err(SparkError::NoResults)));

        backend.set_fail_training(false);
        let state = session.start_training().await.unwrap();
        assert_eq!(state.training_status, TrainingStatus::Complete);
        let results = session.results().unwrap();
        assert_eq!(results.dataset_name, "Custom Dataset");
        assert!(results.output_samples.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_while_training_and_stops_after() {
        let mut session = at_training_step(ModelId::Bert).await;
        let ticket = session.begin_training().unwrap();
        assert_eq!(session.state().training_status, TrainingStatus::Training);
        assert!(matches!(session.begin_training(), Err(SparkError::TrainingInProgress)));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let during = session.progress().value();
        assert!(during > 0.0 && during <= ProgressMeter::CAP);

        let outcome = Err(BackendError::Rejected("boom".to_string()));
        session.finish_training(ticket.id, outcome);
        let settled = session.progress().value();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(session.progress().value(), settled);
        assert_eq!(session.state().training_status, TrainingStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_settling_after_reset_is_dropped() {
        let mut session = at_training_step(ModelId::StableDiffusion).await;
        let ticket = session.begin_training().unwrap();
        session.reset();
        assert!(!session.is_training());

        let backend = session.backend();
        let results = backend.run_training(&ticket.request).await.unwrap();
        session.finish_training(ticket.id, Ok(results));

        assert_eq!(session.state(), &WizardState::initial());
        assert_eq!(session.current_step(), WizardStep::SelectModel);
        assert_eq!(session.progress().percent(), 0);

        // A fresh selection does not inherit the dropped run
        session.select_model(ModelId::Bert);
        session.select_dataset_by_id("5").await.unwrap();
        assert_eq!(session.state().training_status, TrainingStatus::Idle);
        assert_eq!(session.max_allowed_step(), WizardStep::StartTraining);
        assert!(session.results().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_failure_does_not_touch_new_run() {
        let mut session = at_training_step(ModelId::Bert).await;
        let stale = session.begin_training().unwrap();
        session.reset();

        session.select_model(ModelId::Bert);
        session.select_dataset_by_id("5").await.unwrap();
        session.go_next();
        let current = session.begin_training().unwrap();

        session.finish_training(stale.id, Err(BackendError::Rejected("late".to_string())));
        assert_eq!(session.state().training_status, TrainingStatus::Training);
        assert_eq!(session.active_run().map(|t| t.id), Some(current.id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_runs_draw_different_progress() {
        let mut session = at_training_step(ModelId::Bert).await;

        let mut observed = Vec::new();
        for _ in 0..2 {
            let ticket = session.begin_training().unwrap();
            tokio::time::sleep(Duration::from_millis(1_100)).await;
            observed.push(session.progress().value());
            session.finish_training(ticket.id, Err(BackendError::Rejected("again".to_string())));
        }

        assert!(observed.iter().all(|v| *v > 0.0));
        assert_ne!(observed[0], observed[1]);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut session = at_training_step(ModelId::Roberta).await;
        session.select_gpu_by_id("4").await.unwrap();
        session.start_training().await.unwrap();

        assert_eq!(session.reset(), &WizardState::initial());
        assert_eq!(session.current_step(), WizardStep::SelectModel);
        assert!(session.selected_gpu().is_none());
        assert_eq!(session.progress().percent(), 0);
    }

    #[tokio::test]
    async fn test_export_results_json() {
        let mut session = at_training_step(ModelId::Whisper).await;
        assert!(matches!(session.export_results_json(), Err(SparkError::NoResults)));

        session.start_training().await.unwrap();
        let body = session.export_results_json().unwrap();
        assert!(body.contains("\n  \"modelName\": \"Whisper\""));
    }
}
