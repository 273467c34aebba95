use std::fmt::Write as _;

use common::storage::types::{
    qa_pair::ScoredPoint,
    system_prompts::{DEFAULT_ANSWER_SYSTEM_PROMPT, NO_ANSWER_SENTINEL},
};
use serde::{Deserialize, Serialize};

pub const MATCHED_POINTS_MSG: &str = "these are the matched points(questions) from qdrant";
pub const NO_MATCHED_POINTS_MSG: &str = "No matched points found in Qdrant";

/// Response of a search: the generated answer plus the raw hits it was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchAnswer {
    pub user_question: String,
    pub human_like_answer: String,
    pub msg: String,
    pub top_points: Vec<ScoredPoint>,
}

impl SearchAnswer {
    pub fn no_match(query: &str) -> Self {
        Self {
            user_question: query.to_string(),
            human_like_answer: NO_ANSWER_SENTINEL.to_string(),
            msg: NO_MATCHED_POINTS_MSG.to_string(),
            top_points: Vec::new(),
        }
    }

    pub fn matched(query: &str, answer: String, top_points: Vec<ScoredPoint>) -> Self {
        Self {
            user_question: query.to_string(),
            human_like_answer: answer,
            msg: MATCHED_POINTS_MSG.to_string(),
            top_points,
        }
    }

    pub fn is_unanswered(&self) -> bool {
        self.human_like_answer.trim() == NO_ANSWER_SENTINEL
    }
}

/// Numbered `Q:`/`A:` lines, one block per hit, in rank order.
pub fn format_hits(hits: &[ScoredPoint]) -> String {
    let mut formatted = String::new();
    for (rank, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            formatted,
            "{}. Q: {}\n   A: {}",
            rank + 1,
            hit.question(),
            hit.answer()
        );
    }
    formatted
}

pub fn create_answer_prompt(query: &str, hits: &[ScoredPoint]) -> String {
    format!(
        "{DEFAULT_ANSWER_SYSTEM_PROMPT}\n\n{}\nUser Question: {query}\nAnswer:",
        format_hits(hits)
    )
}
