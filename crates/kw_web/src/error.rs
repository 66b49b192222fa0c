use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::optimize::OptimizeError;

/// JSON `{ "error": ... }` responses for the optimisation endpoints.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<OptimizeError> for ApiError {
    fn from(e: OptimizeError) -> Self {
        match e {
            OptimizeError::EmptyText | OptimizeError::PreviouslyRejected => {
                ApiError::BadRequest(e.to_string())
            }
            OptimizeError::NoKeywords => ApiError::Internal(e.to_string()),
            OptimizeError::Core(e) => {
                tracing::error!("Optimization failed: {}", e);
                ApiError::Internal(e.to_string())
            }
        }
    }
}
