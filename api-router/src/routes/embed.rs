use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn embed_text(
    State(state): State<ApiState>,
    Json(body): Json<EmbedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = body.text.unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::ValidationError(
            "Text field is required".to_string(),
        ));
    }

    let embedding = state.embedder.embed(text).await?;

    Ok(Json(json!({ "embedding": embedding })))
}
