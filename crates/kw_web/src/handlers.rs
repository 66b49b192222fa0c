use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kw_core::{
    CmsSubmitRequest, FeedbackRequest, KeywordCollection, OptimizeRequest, OptimizeResponse,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

pub const CMS_ERROR_MESSAGE: &str = "Error submitting content to Contensis";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every document of an allow-listed collection. Unknown names are answered
/// with an empty list and never reach the database.
pub async fn list_keywords(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Response {
    let collection = match kind.parse::<KeywordCollection>() {
        Ok(collection) => collection,
        Err(e) => {
            tracing::warn!("{}", e);
            return Json(Vec::<Value>::new()).into_response();
        }
    };

    match state.store.list_documents(collection).await {
        Ok(documents) => Json(documents).into_response(),
        Err(e) => {
            tracing::error!("Failed to read {} keywords: {}", collection, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading keywords from {}", collection),
            )
                .into_response()
        }
    }
}

pub async fn submit_to_cms(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CmsSubmitRequest>,
) -> Response {
    match state.cms.submit(&request.optimized_content).await {
        Ok((status, body)) => {
            tracing::info!("📤 Submitted content to CMS ({})", status);
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK);
            (status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to submit content to {}: {}", state.cms.url(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, CMS_ERROR_MESSAGE).into_response()
        }
    }
}

pub async fn optimize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let response = state.optimizer.optimize(&request.text).await?;
    Ok(Json(response))
}

pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<Value>, ApiError> {
    state.optimizer.record_feedback(&request.text).await?;
    Ok(Json(json!({
        "message": "Feedback received. We will not optimize this content again."
    })))
}
