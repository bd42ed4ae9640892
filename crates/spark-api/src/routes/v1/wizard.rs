use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use spark::session::{find_dataset, find_gpu};
use spark::{
    RESULTS_FILE_NAME, StepState, TrainingConfig, TrainingConfigPatch, TrainingResults,
    UploadedFile, WizardSession,
};
use tracing::info;
use utoipa::ToSchema;

use super::catalog::{DatasetDto, GpuDto};
use crate::AppState;
use crate::error::{ApiResult, ErrorResponse};

/// Hyperparameters. In a PATCH body an absent key is kept and `null` clears the field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    pub batch_size: Option<u32>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<u32>,
    pub validation_split: Option<f64>,
    pub prompt: Option<String>,
    /// "256x256", "512x512", "768x768" or "1024x1024"
    pub resolution: Option<String>,
    pub seed: Option<u64>,
}

impl From<&TrainingConfig> for ConfigDto {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            epochs: config.epochs,
            validation_split: config.validation_split,
            prompt: config.prompt.clone(),
            resolution: config.resolution.map(|r| r.to_string()),
            seed: config.seed,
        }
    }
}

/// Attached dataset file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDto {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl From<UploadDto> for UploadedFile {
    fn from(dto: UploadDto) -> Self {
        let file = UploadedFile::new(dto.name, dto.size_bytes);
        match dto.content_type {
            Some(content_type) => file.with_content_type(content_type),
            None => file,
        }
    }
}

impl From<&UploadedFile> for UploadDto {
    fn from(file: &UploadedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            content_type: file.content_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpochStatDto {
    pub epoch: u32,
    pub loss: f64,
    pub accuracy: f64,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsDto {
    pub model_name: String,
    pub dataset_name: String,
    pub training_time: String,
    pub accuracy: f64,
    pub loss: f64,
    pub epoch_stats: Vec<EpochStatDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_samples: Option<Vec<String>>,
    pub model_url: String,
    pub reward_earned: f64,
}

impl From<&TrainingResults> for ResultsDto {
    fn from(results: &TrainingResults) -> Self {
        Self {
            model_name: results.model_name.clone(),
            dataset_name: results.dataset_name.clone(),
            training_time: results.training_time.clone(),
            accuracy: results.accuracy,
            loss: results.loss,
            epoch_stats: results
                .epoch_stats
                .iter()
                .map(|s| EpochStatDto {
                    epoch: s.epoch,
                    loss: s.loss,
                    accuracy: s.accuracy,
                })
                .collect(),
            output_samples: results.output_samples.clone(),
            model_url: results.model_url.clone(),
            reward_earned: results.reward_earned,
        }
    }
}

/// One stepper entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepDto {
    pub index: usize,
    pub label: String,
    /// "completed", "current" or "upcoming"
    pub state: String,
    pub reachable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NavigationDto {
    pub show_back: bool,
    pub show_next: bool,
    pub next_enabled: bool,
    pub next_label: String,
}

/// Full view of the wizard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WizardDto {
    pub current_step: usize,
    pub max_allowed_step: usize,
    pub steps: Vec<StepDto>,
    pub navigation: NavigationDto,
    pub selected_model: Option<String>,
    pub selected_dataset: Option<DatasetDto>,
    pub uploaded_file: Option<UploadDto>,
    pub config: ConfigDto,
    /// Whether prompt, resolution and seed apply
    pub generation_params: bool,
    /// "idle", "training", "complete" or "error"
    pub training_status: String,
    pub progress: u8,
    pub can_start_training: bool,
    pub selected_gpu: Option<GpuDto>,
    pub results: Option<ResultsDto>,
    pub revision: u64,
}

impl From<&WizardSession> for WizardDto {
    fn from(session: &WizardSession) -> Self {
        let state = session.state();
        let nav = session.navigation();
        Self {
            current_step: session.current_step().index(),
            max_allowed_step: session.max_allowed_step().index(),
            steps: session
                .stepper()
                .into_iter()
                .map(|s| StepDto {
                    index: s.index,
                    label: s.label,
                    state: match s.state {
                        StepState::Completed => "completed",
                        StepState::Current => "current",
                        StepState::Upcoming => "upcoming",
                    }
                    .to_string(),
                    reachable: s.reachable,
                })
                .collect(),
            navigation: NavigationDto {
                show_back: nav.show_back,
                show_next: nav.show_next,
                next_enabled: nav.next_enabled,
                next_label: nav.next_label.to_string(),
            },
            selected_model: state.selected_model.map(|m| m.to_string()),
            selected_dataset: state.selected_dataset.clone().map(DatasetDto::from),
            uploaded_file: state.uploaded_file.as_ref().map(UploadDto::from),
            config: ConfigDto::from(&state.config),
            generation_params: state.is_generative(),
            training_status: state.training_status.to_string(),
            progress: session.progress().percent(),
            can_start_training: session.can_start_training(),
            selected_gpu: session.selected_gpu().cloned().map(GpuDto::from),
            results: state.training_results.as_ref().map(ResultsDto::from),
            revision: session.revision(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectModelRequest {
    /// Wire name or alias, e.g. "BERT" or "gpt2"
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectByIdRequest {
    /// Catalog id or name
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JumpResponse {
    /// False when the step was locked and the click ignored
    pub moved: bool,
    pub wizard: WizardDto,
}

/// Accepted training run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReceipt {
    pub run_id: String,
    /// RFC 3339 start time
    pub started_at: String,
    pub training_status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wizard))
        .route("/model", post(select_model))
        .route("/dataset", post(select_dataset))
        .route("/upload", post(upload_file))
        .route("/config", patch(update_config))
        .route("/gpu", post(select_gpu))
        .route("/next", post(next_step))
        .route("/back", post(previous_step))
        .route("/step/{index}", post(jump_to_step))
        .route("/training", post(start_training))
        .route("/results", get(download_results))
        .route("/reset", post(reset_wizard))
}

/// Current wizard view
#[utoipa::path(
    get,
    path = "/api/v1/wizard",
    responses((status = 200, description = "Wizard view", body = WizardDto)),
    tag = "wizard"
)]
pub async fn get_wizard(State(state): State<AppState>) -> Json<WizardDto> {
    let session = state.session.lock().await;
    Json(WizardDto::from(&*session))
}

/// Select a model
#[utoipa::path(
    post,
    path = "/api/v1/wizard/model",
    request_body = SelectModelRequest,
    responses(
        (status = 200, description = "Model selected", body = WizardDto),
        (status = 400, description = "Unknown model", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn select_model(
    State(state): State<AppState>,
    Json(request): Json<SelectModelRequest>,
) -> ApiResult<Json<WizardDto>> {
    let mut session = state.session.lock().await;
    session.select_model_by_name(&request.model)?;
    Ok(Json(WizardDto::from(&*session)))
}

/// Select a hosted dataset
#[utoipa::path(
    post,
    path = "/api/v1/wizard/dataset",
    request_body = SelectByIdRequest,
    responses(
        (status = 200, description = "Dataset selected", body = WizardDto),
        (status = 404, description = "Unknown dataset", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn select_dataset(
    State(state): State<AppState>,
    Json(request): Json<SelectByIdRequest>,
) -> ApiResult<Json<WizardDto>> {
    // Catalog lookup happens outside the session lock
    let datasets = state.backend.list_datasets().await?;
    let dataset = find_dataset(datasets, &request.id)?;

    let mut session = state.session.lock().await;
    session.select_dataset(dataset);
    Ok(Json(WizardDto::from(&*session)))
}

/// Attach a dataset file
#[utoipa::path(
    post,
    path = "/api/v1/wizard/upload",
    request_body = UploadDto,
    responses(
        (status = 200, description = "File attached", body = WizardDto),
        (status = 400, description = "Not a .csv, .json or .zip file, or larger than 10GB", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Json(request): Json<UploadDto>,
) -> ApiResult<Json<WizardDto>> {
    let mut session = state.session.lock().await;
    session.upload_file(UploadedFile::from(request))?;
    Ok(Json(WizardDto::from(&*session)))
}

/// Merge hyperparameters into the configuration
#[utoipa::path(
    patch,
    path = "/api/v1/wizard/config",
    request_body = ConfigDto,
    responses(
        (status = 200, description = "Configuration updated", body = WizardDto),
        (status = 400, description = "Invalid value", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<TrainingConfigPatch>,
) -> ApiResult<Json<WizardDto>> {
    let mut session = state.session.lock().await;
    session.update_config(patch)?;
    Ok(Json(WizardDto::from(&*session)))
}

/// Pick a GPU for cost display
#[utoipa::path(
    post,
    path = "/api/v1/wizard/gpu",
    request_body = SelectByIdRequest,
    responses(
        (status = 200, description = "GPU selected", body = WizardDto),
        (status = 404, description = "Unknown GPU", body = ErrorResponse),
        (status = 409, description = "GPU unavailable", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn select_gpu(
    State(state): State<AppState>,
    Json(request): Json<SelectByIdRequest>,
) -> ApiResult<Json<WizardDto>> {
    let gpus = state.backend.list_gpus().await?;
    let gpu = find_gpu(gpus, &request.id)?;

    let mut session = state.session.lock().await;
    session.select_gpu(gpu)?;
    Ok(Json(WizardDto::from(&*session)))
}

/// Next button
#[utoipa::path(
    post,
    path = "/api/v1/wizard/next",
    responses((status = 200, description = "Wizard view", body = WizardDto)),
    tag = "wizard"
)]
pub async fn next_step(State(state): State<AppState>) -> Json<WizardDto> {
    let mut session = state.session.lock().await;
    session.go_next();
    Json(WizardDto::from(&*session))
}

/// Back button
#[utoipa::path(
    post,
    path = "/api/v1/wizard/back",
    responses((status = 200, description = "Wizard view", body = WizardDto)),
    tag = "wizard"
)]
pub async fn previous_step(State(state): State<AppState>) -> Json<WizardDto> {
    let mut session = state.session.lock().await;
    session.go_back();
    Json(WizardDto::from(&*session))
}

/// Stepper click. Locked steps are ignored.
#[utoipa::path(
    post,
    path = "/api/v1/wizard/step/{index}",
    params(("index" = usize, Path, description = "Step index, 0 to 4")),
    responses(
        (status = 200, description = "Click handled", body = JumpResponse),
        (status = 404, description = "No such step", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn jump_to_step(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Json<JumpResponse>> {
    let mut session = state.session.lock().await;
    let moved = session.click_step(index)?;
    Ok(Json(JumpResponse {
        moved,
        wizard: WizardDto::from(&*session),
    }))
}

/// Start training in the background
#[utoipa::path(
    post,
    path = "/api/v1/wizard/training",
    responses(
        (status = 202, description = "Training started", body = TrainingReceipt),
        (status = 409, description = "Wizard not ready or already training", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn start_training(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let (ticket, status) = {
        let mut session = state.session.lock().await;
        let ticket = session.begin_training()?;
        (ticket, session.state().training_status)
    };

    let receipt = TrainingReceipt {
        run_id: ticket.id.to_string(),
        started_at: ticket.started_at.to_rfc3339(),
        training_status: status.to_string(),
    };
    info!(run_id = %ticket.id, "Training accepted");

    let backend = state.backend.clone();
    let session = state.session.clone();
    tokio::spawn(async move {
        let outcome = backend.run_training(&ticket.request).await;
        session.lock().await.finish_training(ticket.id, outcome);
    });

    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// Download results as training-results.json
#[utoipa::path(
    get,
    path = "/api/v1/wizard/results",
    responses(
        (status = 200, description = "Results document", body = ResultsDto, content_type = "application/json"),
        (status = 404, description = "No results yet", body = ErrorResponse)
    ),
    tag = "wizard"
)]
pub async fn download_results(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.session.lock().await.export_results_json()?;
    let disposition = format!("attachment; filename=\"{}\"", RESULTS_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Start over
#[utoipa::path(
    post,
    path = "/api/v1/wizard/reset",
    responses((status = 200, description = "Initial wizard", body = WizardDto)),
    tag = "wizard"
)]
pub async fn reset_wizard(State(state): State<AppState>) -> Json<WizardDto> {
    let mut session = state.session.lock().await;
    session.reset();
    Json(WizardDto::from(&*session))
}
