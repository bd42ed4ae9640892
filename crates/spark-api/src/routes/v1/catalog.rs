use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};
use spark::{Dataset, Gpu, ModelId};
use utoipa::ToSchema;

use crate::AppState;
use crate::error::{ApiResult, ErrorResponse};

/// Trainable model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelDto {
    /// Wire name, e.g. "Stable Diffusion"
    pub id: String,
    pub display_name: String,
    pub description: String,
    /// Accepts prompt, resolution and seed
    pub generation_params: bool,
    /// Returns sample images
    pub image_samples: bool,
}

impl From<ModelId> for ModelDto {
    fn from(model: ModelId) -> Self {
        let caps = model.capabilities();
        Self {
            id: model.to_string(),
            display_name: model.display_name().to_string(),
            description: model.description().to_string(),
            generation_params: caps.generation_params,
            image_samples: caps.image_samples,
        }
    }
}

/// Hosted dataset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub description: String,
    pub size: String,
    pub examples: u64,
}

impl From<Dataset> for DatasetDto {
    fn from(dataset: Dataset) -> Self {
        Self {
            id: dataset.id.to_string(),
            name: dataset.name,
            data_type: dataset.data_type,
            description: dataset.description,
            size: dataset.size,
            examples: dataset.example_count,
        }
    }
}

/// GPU offer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GpuDto {
    pub id: String,
    pub name: String,
    pub vram: String,
    /// Dollars per hour
    pub cost: f64,
    pub available: bool,
    pub estimated_time: String,
    /// Estimated hours times hourly cost
    pub estimated_cost: f64,
}

impl From<Gpu> for GpuDto {
    fn from(gpu: Gpu) -> Self {
        let estimated_cost = gpu.estimated_cost();
        Self {
            id: gpu.id,
            name: gpu.name,
            vram: gpu.vram,
            cost: gpu.cost,
            available: gpu.available,
            estimated_time: gpu.estimated_time,
            estimated_cost,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models))
        .route("/datasets", get(list_datasets))
        .route("/gpus", get(list_gpus))
}

/// List trainable models
#[utoipa::path(
    get,
    path = "/api/v1/models",
    responses(
        (status = 200, description = "Models in catalog order", body = [ModelDto])
    ),
    tag = "catalog"
)]
pub async fn list_models() -> Json<Vec<ModelDto>> {
    Json(ModelId::all().into_iter().map(ModelDto::from).collect())
}

/// List hosted datasets
#[utoipa::path(
    get,
    path = "/api/v1/datasets",
    responses(
        (status = 200, description = "Hosted datasets", body = [DatasetDto]),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_datasets(State(state): State<AppState>) -> ApiResult<Json<Vec<DatasetDto>>> {
    let datasets = state.backend.list_datasets().await?;
    Ok(Json(datasets.into_iter().map(DatasetDto::from).collect()))
}

/// List GPU offers
#[utoipa::path(
    get,
    path = "/api/v1/gpus",
    responses(
        (status = 200, description = "GPU offers", body = [GpuDto]),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_gpus(State(state): State<AppState>) -> ApiResult<Json<Vec<GpuDto>>> {
    let gpus = state.backend.list_gpus().await?;
    Ok(Json(gpus.into_iter().map(GpuDto::from).collect()))
}
