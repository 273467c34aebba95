use common::storage::types::qa_pair::QaPair;
use serde::{Deserialize, Serialize};

/// What one chunk contributed to an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Extracted {
        index: usize,
        heading: String,
        pairs: Vec<QaPair>,
    },
    Failed {
        index: usize,
        heading: String,
        reason: String,
    },
}

impl ChunkOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Extracted { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub total_chunks: usize,
    pub total_qa_generated: usize,
    pub qa_results: Vec<QaPair>,
}

impl IngestionResult {
    /// Collects pairs in chunk order regardless of the order outcomes arrive in.
    /// Failed chunks count towards `total_chunks` only.
    pub fn from_outcomes(total_chunks: usize, mut outcomes: Vec<ChunkOutcome>) -> Self {
        outcomes.sort_by_key(ChunkOutcome::index);

        let qa_results: Vec<QaPair> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                ChunkOutcome::Extracted { pairs, .. } => Some(pairs),
                ChunkOutcome::Failed { .. } => None,
            })
            .flatten()
            .collect();

        Self {
            total_chunks,
            total_qa_generated: qa_results.len(),
            qa_results,
        }
    }
}
