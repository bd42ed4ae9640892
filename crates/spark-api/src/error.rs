//! Mapping of wizard errors onto HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use spark::{CoreError, SparkError};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error carrying its status code
#[derive(Error, Debug)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<SparkError> for ApiError {
    fn from(err: SparkError) -> Self {
        let status = match &err {
            SparkError::Core(core) => match core {
                CoreError::UnknownStep(_) => StatusCode::NOT_FOUND,
                CoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            SparkError::UnknownDataset(_) | SparkError::UnknownGpu(_) | SparkError::NoResults => {
                StatusCode::NOT_FOUND
            }
            SparkError::ModelRequired
            | SparkError::DatasetRequired
            | SparkError::TrainingInProgress
            | SparkError::NotOnTrainingStep(_)
            | SparkError::GpuUnavailable(_) => StatusCode::CONFLICT,
            SparkError::Backend(_) | SparkError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<spark::BackendError> for ApiError {
    fn from(err: spark::BackendError) -> Self {
        SparkError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SparkError::Core(CoreError::InvalidSeed), StatusCode::BAD_REQUEST),
            (SparkError::Core(CoreError::UnknownStep(7)), StatusCode::NOT_FOUND),
            (SparkError::UnknownDataset("9".to_string()), StatusCode::NOT_FOUND),
            (SparkError::GpuUnavailable("A100".to_string()), StatusCode::CONFLICT),
            (SparkError::TrainingInProgress, StatusCode::CONFLICT),
            (SparkError::NoResults, StatusCode::NOT_FOUND),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_display_carries_status_and_message() {
        let err = ApiError::from(SparkError::Core(CoreError::UnsupportedFileType(
            "notes.txt".to_string(),
        )));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("400 Bad Request: "));
        assert!(err.to_string().contains("notes.txt"));
    }
}
