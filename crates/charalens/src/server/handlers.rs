//! HTTP handlers for health checks and character recognition.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use charalens_core::{RecognitionResult, Recognizer};
use serde::Serialize;

use super::errors::ApiError;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<Recognizer>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Charalens API is running",
        version: charalens_core::VERSION,
    })
}

/// `POST /recognize` with a multipart `file` field.
pub async fn recognize(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecognitionResult>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;

        tracing::info!(
            "Recognizing {:?} ({} bytes, {})",
            file_name,
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type")
        );

        let result = state
            .recognizer
            .recognize(bytes.to_vec(), content_type.as_deref())
            .await?;

        tracing::info!(
            "{:?} → {:?} ({:.3})",
            file_name,
            result.prediction_result.character_name,
            result.prediction_result.confidence
        );
        return Ok(Json(result));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field {FILE_FIELD:?}"
    )))
}
