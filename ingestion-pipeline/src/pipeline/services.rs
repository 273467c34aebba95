use std::sync::Arc;

use async_trait::async_trait;
use common::{
    error::AppError,
    utils::completion::{CompletionProvider, CompletionResponse},
};

use crate::utils::pdf_ingestion::extract_pdf_text;

/// Collaborators the orchestrator drives: text extraction and LLM completion.
#[async_trait]
pub trait PipelineServices: Send + Sync {
    async fn extract_text(&self, pdf_bytes: Vec<u8>) -> Result<String, AppError>;

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AppError>;
}

pub struct DefaultPipelineServices {
    completion: Arc<dyn CompletionProvider>,
}

impl DefaultPipelineServices {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl PipelineServices for DefaultPipelineServices {
    async fn extract_text(&self, pdf_bytes: Vec<u8>) -> Result<String, AppError> {
        extract_pdf_text(pdf_bytes).await
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AppError> {
        self.completion.complete(prompt).await
    }
}
