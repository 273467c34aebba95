use common::error::AppError;
use futures::stream::{self, StreamExt};
use state_machines::core::GuardError;
use tracing::{debug, info, instrument, warn};

use crate::utils::{
    chunker::{chunk_text, Chunk},
    llm_instructions::build_qa_prompt,
    pdf_ingestion::validate_pdf_upload,
    response_parser::parse_qa_response,
};

use super::{
    context::PipelineContext,
    outcome::ChunkOutcome,
    services::PipelineServices,
    state::{Chunked, Generated, IngestionMachine, Ready, TextExtracted, Validated},
};

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub fn validate_upload(
    machine: IngestionMachine<(), Ready>,
    ctx: &mut PipelineContext<'_>,
    pdf_bytes: &[u8],
) -> Result<IngestionMachine<(), Validated>, AppError> {
    validate_pdf_upload(ctx.file_name, pdf_bytes)?;

    info!(
        run_id = %ctx.run_id,
        file_name = ctx.file_name.unwrap_or_default(),
        bytes = pdf_bytes.len(),
        "pdf upload accepted"
    );

    machine
        .validate()
        .map_err(|(_, guard)| map_guard_error("validate", &guard))
}

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub async fn extract_text(
    machine: IngestionMachine<(), Validated>,
    ctx: &mut PipelineContext<'_>,
    pdf_bytes: Vec<u8>,
) -> Result<IngestionMachine<(), TextExtracted>, AppError> {
    let text = ctx.services.extract_text(pdf_bytes).await?;

    debug!(
        run_id = %ctx.run_id,
        text_chars = text.chars().count(),
        "pdf text extracted"
    );

    ctx.document_text = Some(text);

    machine
        .extract()
        .map_err(|(_, guard)| map_guard_error("extract", &guard))
}

#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub fn chunk_document(
    machine: IngestionMachine<(), TextExtracted>,
    ctx: &mut PipelineContext<'_>,
) -> Result<IngestionMachine<(), Chunked>, AppError> {
    let text = ctx.take_document_text()?;
    let chunks = chunk_text(&text, ctx.pipeline_config.chunker);

    if chunks.is_empty() {
        return Err(AppError::EmptyDocument);
    }

    info!(
        run_id = %ctx.run_id,
        chunk_count = chunks.len(),
        "processing chunks from PDF"
    );

    ctx.chunks = chunks;

    machine
        .chunk()
        .map_err(|(_, guard)| map_guard_error("chunk", &guard))
}

/// Runs extraction for every chunk with bounded concurrency. Outcomes keep chunk
/// order, and a failing chunk never cancels its siblings.
#[instrument(level = "trace", skip_all, fields(run_id = %ctx.run_id))]
pub async fn generate_qa(
    machine: IngestionMachine<(), Chunked>,
    ctx: &mut PipelineContext<'_>,
) -> Result<IngestionMachine<(), Generated>, AppError> {
    let tuning = &ctx.pipeline_config.tuning;
    let concurrency = tuning.chunk_concurrency.max(1);
    let question_chars = tuning.fallback_question_chars;
    let services = ctx.services;

    // Futures are collected up front (they stay idle until polled) so the
    // stream type carries no closure; this sidesteps rustc's higher-ranked
    // `Send` inference bug (rust-lang/rust#64552) for callers spawning this.
    let chunk_futures: Vec<_> = ctx
        .chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| process_chunk(services, index, chunk, question_chars))
        .collect();

    let outcomes: Vec<ChunkOutcome> = stream::iter(chunk_futures)
        .buffered(concurrency)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    debug!(
        run_id = %ctx.run_id,
        chunk_count = outcomes.len(),
        failed_chunks = failed,
        "chunk extraction finished"
    );

    ctx.outcomes = outcomes;

    machine
        .generate()
        .map_err(|(_, guard)| map_guard_error("generate", &guard))
}

async fn process_chunk(
    services: &dyn PipelineServices,
    index: usize,
    chunk: &Chunk,
    question_chars: usize,
) -> ChunkOutcome {
    debug!(chunk_index = index, heading = %chunk.heading, "processing chunk");

    let prompt = build_qa_prompt(&chunk.text);

    let response = match services.complete(&prompt).await {
        Ok(response) => response,
        Err(err) => return chunk_failed(index, chunk, err.to_string()),
    };

    if !response.is_success() {
        return chunk_failed(
            index,
            chunk,
            format!("LLM API returned status {}", response.status),
        );
    }

    let pairs = parse_qa_response(&response, &chunk.text, question_chars);
    debug!(
        chunk_index = index,
        heading = %chunk.heading,
        pair_count = pairs.len(),
        "extracted Q&A pairs"
    );

    ChunkOutcome::Extracted {
        index,
        heading: chunk.heading.clone(),
        pairs,
    }
}

fn chunk_failed(index: usize, chunk: &Chunk, reason: String) -> ChunkOutcome {
    warn!(
        chunk_index = index,
        chunk_heading = %chunk.heading,
        error = %reason,
        "chunk extraction failed; skipping"
    );
    ChunkOutcome::Failed {
        index,
        heading: chunk.heading.clone(),
        reason,
    }
}

fn map_guard_error(event: &str, guard: &GuardError) -> AppError {
    AppError::InternalError(format!(
        "invalid ingestion pipeline transition during {event}: {guard:?}"
    ))
}
