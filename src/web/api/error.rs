use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::PredictError;
use crate::propagate::PropagationError;
use crate::tle::TleError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    Propagation(String),
    Catalog(TleError),
    Timeout,
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidParameters(msg) => ApiError::Validation(msg),
            PredictError::Propagation(e) => e.into(),
        }
    }
}

impl From<PropagationError> for ApiError {
    fn from(e: PropagationError) -> Self {
        ApiError::Propagation(e.to_string())
    }
}

impl From<TleError> for ApiError {
    fn from(e: TleError) -> Self {
        ApiError::Catalog(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("satellite_not_found", &id)),
            )
                .into_response(),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::Propagation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::with_message("propagation_failed", &msg)),
            )
                .into_response(),
            ApiError::Catalog(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::with_message("catalog_unavailable", &e.to_string())),
            )
                .into_response(),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorResponse::new("query_timeout")),
            )
                .into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("internal_error", &msg)),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
