use std::path::PathBuf;

use common::utils::config::AppConfig;

use crate::utils::{chunker::ChunkerOptions, response_parser::FALLBACK_QUESTION_CHARS};

#[derive(Debug, Clone)]
pub struct IngestionTuning {
    /// Upper bound on chunks sent to the LLM at the same time.
    pub chunk_concurrency: usize,
    pub fallback_question_chars: usize,
}

impl Default for IngestionTuning {
    fn default() -> Self {
        Self {
            chunk_concurrency: 4,
            fallback_question_chars: FALLBACK_QUESTION_CHARS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestionConfig {
    pub tuning: IngestionTuning,
    pub chunker: ChunkerOptions,
    pub qa_log_path: Option<PathBuf>,
}

impl IngestionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            tuning: IngestionTuning {
                chunk_concurrency: config.chunk_concurrency.max(1),
                ..IngestionTuning::default()
            },
            chunker: ChunkerOptions::default(),
            qa_log_path: config.qa_log_path.as_ref().map(PathBuf::from),
        }
    }
}
