use common::error::AppError;
use tracing::error;

use crate::utils::chunker::Chunk;

use super::{config::IngestionConfig, outcome::ChunkOutcome, services::PipelineServices};

pub struct PipelineContext<'a> {
    pub run_id: String,
    pub file_name: Option<&'a str>,
    pub pipeline_config: &'a IngestionConfig,
    pub services: &'a dyn PipelineServices,
    pub document_text: Option<String>,
    pub chunks: Vec<Chunk>,
    pub outcomes: Vec<ChunkOutcome>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        file_name: Option<&'a str>,
        pipeline_config: &'a IngestionConfig,
        services: &'a dyn PipelineServices,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            file_name,
            pipeline_config,
            services,
            document_text: None,
            chunks: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn take_document_text(&mut self) -> Result<String, AppError> {
        self.document_text.take().ok_or_else(|| {
            AppError::InternalError("document text expected to be available for chunking".into())
        })
    }

    pub fn abort(&mut self, err: AppError) -> AppError {
        error!(
            run_id = %self.run_id,
            file_name = self.file_name.unwrap_or("<unnamed>"),
            error = %err,
            "ingestion pipeline aborted"
        );
        err
    }
}
