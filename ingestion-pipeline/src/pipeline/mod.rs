mod config;
mod context;
mod outcome;
mod services;
mod stages;
mod state;

pub use config::{IngestionConfig, IngestionTuning};
pub use outcome::{ChunkOutcome, IngestionResult};
#[allow(clippy::module_name_repetitions)]
pub use services::{DefaultPipelineServices, PipelineServices};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::{error::AppError, utils::completion::CompletionProvider};
use tracing::{info, warn};

use crate::utils::qa_log::write_qa_log;

use self::{
    context::PipelineContext,
    stages::{chunk_document, extract_text, generate_qa, validate_upload},
    state::ready,
};

/// Turns an uploaded PDF into Q&A pairs: validate, extract text, chunk by
/// heading, then ask the LLM for pairs chunk by chunk.
#[allow(clippy::module_name_repetitions)]
pub struct IngestionPipeline {
    pipeline_config: IngestionConfig,
    services: Arc<dyn PipelineServices>,
}

impl IngestionPipeline {
    pub fn new(completion: Arc<dyn CompletionProvider>, pipeline_config: IngestionConfig) -> Self {
        Self::with_services(
            pipeline_config,
            Arc::new(DefaultPipelineServices::new(completion)),
        )
    }

    pub fn with_services(
        pipeline_config: IngestionConfig,
        services: Arc<dyn PipelineServices>,
    ) -> Self {
        Self {
            pipeline_config,
            services,
        }
    }

    fn duration_millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }

    /// Validation, unreadable documents and documents without chunkable
    /// content fail the whole call. Chunk-level failures only drop that chunk.
    #[tracing::instrument(skip_all, fields(file_name = file_name.unwrap_or_default(), bytes = pdf_bytes.len()))]
    pub async fn process(
        &self,
        file_name: Option<&str>,
        pdf_bytes: Vec<u8>,
    ) -> Result<IngestionResult, AppError> {
        let mut ctx = PipelineContext::new(
            file_name,
            &self.pipeline_config,
            self.services.as_ref(),
        );

        let machine = ready();
        let pipeline_started = Instant::now();

        let machine =
            validate_upload(machine, &mut ctx, &pdf_bytes).map_err(|err| ctx.abort(err))?;

        let stage_start = Instant::now();
        let machine = extract_text(machine, &mut ctx, pdf_bytes)
            .await
            .map_err(|err| ctx.abort(err))?;
        let extract_duration = stage_start.elapsed();

        let machine = chunk_document(machine, &mut ctx).map_err(|err| ctx.abort(err))?;

        let stage_start = Instant::now();
        let _machine = generate_qa(machine, &mut ctx)
            .await
            .map_err(|err| ctx.abort(err))?;
        let generate_duration = stage_start.elapsed();

        let total_chunks = ctx.chunks.len();
        let failed_chunks = ctx.outcomes.iter().filter(|o| o.is_failed()).count();
        let result = IngestionResult::from_outcomes(total_chunks, std::mem::take(&mut ctx.outcomes));

        info!(
            run_id = %ctx.run_id,
            total_chunks,
            failed_chunks,
            total_qa_generated = result.total_qa_generated,
            extract_ms = Self::duration_millis(extract_duration),
            generate_ms = Self::duration_millis(generate_duration),
            total_ms = Self::duration_millis(pipeline_started.elapsed()),
            "PDF processing complete"
        );

        if let Some(path) = &self.pipeline_config.qa_log_path {
            if let Err(err) = write_qa_log(path, &result).await {
                warn!(path = %path.display(), error = %err, "failed to write Q&A log");
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests;
