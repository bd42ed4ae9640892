use axum::Router;
use axum::http::HeaderValue;
use spark::{SharedBackend, WizardSession};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ApiConfig, CorsConfig};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// The single wizard session served by this process
    pub session: Arc<Mutex<WizardSession>>,
    /// Same backend the session uses, callable without the session lock
    pub backend: SharedBackend,
}

impl AppState {
    pub fn new(session: WizardSession) -> Self {
        let backend = session.backend();
        Self {
            session: Arc::new(Mutex::new(session)),
            backend,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::v1::catalog::list_models,
        crate::routes::v1::catalog::list_datasets,
        crate::routes::v1::catalog::list_gpus,
        crate::routes::v1::wizard::get_wizard,
        crate::routes::v1::wizard::select_model,
        crate::routes::v1::wizard::select_dataset,
        crate::routes::v1::wizard::upload_file,
        crate::routes::v1::wizard::update_config,
        crate::routes::v1::wizard::select_gpu,
        crate::routes::v1::wizard::next_step,
        crate::routes::v1::wizard::previous_step,
        crate::routes::v1::wizard::jump_to_step,
        crate::routes::v1::wizard::start_training,
        crate::routes::v1::wizard::download_results,
        crate::routes::v1::wizard::reset_wizard,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::error::ErrorResponse,
            crate::routes::v1::catalog::ModelDto,
            crate::routes::v1::catalog::DatasetDto,
            crate::routes::v1::catalog::GpuDto,
            crate::routes::v1::wizard::WizardDto,
            crate::routes::v1::wizard::ConfigDto,
            crate::routes::v1::wizard::UploadDto,
            crate::routes::v1::wizard::ResultsDto,
            crate::routes::v1::wizard::SelectModelRequest,
            crate::routes::v1::wizard::SelectByIdRequest,
            crate::routes::v1::wizard::JumpResponse,
            crate::routes::v1::wizard::TrainingReceipt,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Models, datasets and GPUs"),
        (name = "wizard", description = "Training wizard session")
    )
)]
pub struct ApiDoc;

/// Build API application with default settings
pub fn build_app(state: AppState) -> Router {
    build_router(state, &ApiConfig::default())
}

/// Build API application honouring the Swagger and CORS settings
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    let mut router = Router::new().merge(routes::routes());
    if config.enable_swagger {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
    router
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allows_any() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = cors
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
