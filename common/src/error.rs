use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No content extracted from PDF")]
    EmptyDocument,
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("LLM API error (status {status}): {body}")]
    LlmStatus { status: u16, body: String },
    #[error("Vector store error (status {status}): {body}")]
    VectorStore { status: u16, body: String },
    #[error("Embedding error: {0}")]
    Embedding(String),
    #[error("Ingestion Processing error: {0}")]
    Processing(String),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}
