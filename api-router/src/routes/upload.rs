use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use common::{error::AppError, storage::types::qa_pair::QaPair};
use serde::Serialize;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadParams {
    // Size is bounded by the route's body limit.
    #[form_data(limit = "unlimited")]
    pub file: Option<FieldData<Bytes>>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub qa_pairs: Vec<QaPair>,
    pub total_chunks: usize,
    pub total_qa_generated: usize,
}

pub async fn upload_pdf(
    State(state): State<ApiState>,
    TypedMultipart(input): TypedMultipart<UploadParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file = input
        .file
        .ok_or_else(|| ApiError::ValidationError("No file part".to_string()))?;
    let file_name = file.metadata.file_name.clone();

    info!(
        file_name = file_name.as_deref().unwrap_or_default(),
        bytes = file.contents.len(),
        "Received PDF upload"
    );

    let result = state
        .ingestion
        .process(file_name.as_deref(), file.contents.to_vec())
        .await
        .map_err(upload_failure)?;

    Ok(Json(UploadResponse {
        message: "Processing complete",
        qa_pairs: result.qa_results,
        total_chunks: result.total_chunks,
        total_qa_generated: result.total_qa_generated,
    }))
}

/// Every ingestion failure is reported to the uploader as a bad request.
fn upload_failure(err: AppError) -> ApiError {
    match err {
        AppError::Validation(message) => ApiError::ValidationError(message),
        other => ApiError::ValidationError(other.to_string()),
    }
}
