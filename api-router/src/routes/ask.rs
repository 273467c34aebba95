use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::debug;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

pub async fn ask_question(
    State(state): State<ApiState>,
    Json(body): Json<AskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = body
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::ValidationError("No question provided".to_string()))?;

    debug!(question_chars = question.chars().count(), "forwarding question to LLM");
    let result = state.completion.answer(&question).await?;

    Ok(Json(result))
}
