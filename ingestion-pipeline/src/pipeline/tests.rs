use std::sync::Arc;

use async_trait::async_trait;
use common::{
    error::AppError, storage::types::qa_pair::QaPair, utils::completion::CompletionResponse,
};
use serde_json::json;
use tokio::sync::Mutex;

use super::{
    config::{IngestionConfig, IngestionTuning},
    services::PipelineServices,
    IngestionPipeline,
};
use crate::utils::response_parser::FALLBACK_QUESTION_CHARS;

const PDF_BYTES: &[u8] = b"%PDF-1.7\n% test document";

fn envelope(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

fn pairs_json(pairs: &[(&str, &str)]) -> String {
    let items: Vec<_> = pairs
        .iter()
        .map(|(q, a)| json!({ "question": q, "answer": a }))
        .collect();
    serde_json::Value::Array(items).to_string()
}

/// Replies per chunk based on a marker found in the prompt.
struct MockServices {
    document_text: String,
    replies: Vec<(&'static str, Result<CompletionResponse, String>)>,
    prompts: Mutex<Vec<String>>,
}

impl MockServices {
    fn new(document_text: &str) -> Self {
        Self {
            document_text: document_text.to_string(),
            replies: Vec::new(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn reply(mut self, marker: &'static str, status: u16, body: String) -> Self {
        self.replies
            .push((marker, Ok(CompletionResponse::from_body(status, body))));
        self
    }

    fn fail(mut self, marker: &'static str, reason: &str) -> Self {
        self.replies.push((marker, Err(reason.to_string())));
        self
    }
}

#[async_trait]
impl PipelineServices for MockServices {
    async fn extract_text(&self, _pdf_bytes: Vec<u8>) -> Result<String, AppError> {
        Ok(self.document_text.clone())
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AppError> {
        self.prompts.lock().await.push(prompt.to_string());
        for (marker, reply) in &self.replies {
            if prompt.contains(marker) {
                return reply.clone().map_err(AppError::Llm);
            }
        }
        Err(AppError::Llm("no reply configured".into()))
    }
}

fn pipeline(services: MockServices, concurrency: usize) -> (IngestionPipeline, Arc<MockServices>) {
    let services = Arc::new(services);
    let config = IngestionConfig {
        tuning: IngestionTuning {
            chunk_concurrency: concurrency,
            fallback_question_chars: FALLBACK_QUESTION_CHARS,
        },
        ..IngestionConfig::default()
    };
    let pipeline = IngestionPipeline::with_services(config, services.clone());
    (pipeline, services)
}

const THREE_SECTIONS: &str = "FIRST SECTION\nalpha body text\n\
                              SECOND SECTION\nbeta body text\n\
                              THIRD SECTION\ngamma body text\n";

#[tokio::test]
async fn failing_chunk_is_isolated() {
    let services = MockServices::new(THREE_SECTIONS)
        .reply(
            "alpha",
            200,
            envelope(&pairs_json(&[("Q1", "A1"), ("Q2", "A2")])),
        )
        .fail("beta", "connection reset")
        .reply("gamma", 200, envelope(&pairs_json(&[("Q3", "A3")])));
    let (pipeline, _) = pipeline(services, 1);

    let result = pipeline
        .process(Some("guide.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    assert_eq!(result.total_chunks, 3);
    assert_eq!(result.total_qa_generated, 3);
    assert_eq!(
        result.qa_results,
        vec![
            QaPair::new("Q1", "A1"),
            QaPair::new("Q2", "A2"),
            QaPair::new("Q3", "A3"),
        ]
    );
}

#[tokio::test]
async fn results_keep_chunk_order_under_concurrency() {
    let services = MockServices::new(THREE_SECTIONS)
        .reply("alpha", 200, envelope(&pairs_json(&[("Q1", "A1")])))
        .reply("beta", 200, envelope(&pairs_json(&[("Q2", "A2")])))
        .reply("gamma", 200, envelope(&pairs_json(&[("Q3", "A3")])));
    let (pipeline, services) = pipeline(services, 3);

    let result = pipeline
        .process(Some("guide.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    let questions: Vec<_> = result.qa_results.iter().map(|p| p.question.as_str()).collect();
    assert_eq!(questions, vec!["Q1", "Q2", "Q3"]);
    assert_eq!(services.prompts.lock().await.len(), 3);
}

#[tokio::test]
async fn non_success_status_skips_the_chunk() {
    let services = MockServices::new(THREE_SECTIONS)
        .reply("alpha", 200, envelope(&pairs_json(&[("Q1", "A1")])))
        .reply("beta", 503, r#"{"error":"overloaded"}"#.to_string())
        .reply("gamma", 200, envelope(&pairs_json(&[("Q3", "A3")])));
    let (pipeline, _) = pipeline(services, 2);

    let result = pipeline
        .process(Some("guide.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    assert_eq!(result.total_chunks, 3);
    assert_eq!(result.total_qa_generated, 2);
}

#[tokio::test]
async fn unparsable_reply_yields_fallback_pair() {
    let services = MockServices::new("no headings here, only prose about gardening tools")
        .reply("gardening", 200, envelope("I cannot extract Q&A from this."));
    let (pipeline, _) = pipeline(services, 1);

    let result = pipeline
        .process(Some("garden.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    assert_eq!(result.total_chunks, 1);
    assert_eq!(
        result.qa_results,
        vec![QaPair::new(
            "no headings here, only prose about gardening tools",
            "I cannot extract Q&A from this."
        )]
    );
}

#[tokio::test]
async fn prompt_contains_chunk_body_not_heading_only() {
    let services = MockServices::new("OVERVIEW\nthe body of the overview\n")
        .reply("overview", 200, envelope(&pairs_json(&[("Q", "A")])));
    let (pipeline, services) = pipeline(services, 1);

    pipeline
        .process(Some("doc.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    let prompts = services.prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("the body of the overview"));
}

#[tokio::test]
async fn blank_document_is_a_fatal_error() {
    let services = MockServices::new("   \n\n  \t");
    let (pipeline, services) = pipeline(services, 1);

    let err = pipeline
        .process(Some("blank.pdf"), PDF_BYTES.to_vec())
        .await
        .expect_err("blank document");

    assert!(matches!(err, AppError::EmptyDocument));
    assert!(services.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn wrong_extension_fails_before_extraction() {
    let services = MockServices::new(THREE_SECTIONS);
    let (pipeline, services) = pipeline(services, 1);

    let err = pipeline
        .process(Some("guide.docx"), PDF_BYTES.to_vec())
        .await
        .expect_err("invalid upload");

    assert!(matches!(err, AppError::Validation(_)));
    assert!(services.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn all_chunks_failing_still_succeeds_with_zero_pairs() {
    let services = MockServices::new(THREE_SECTIONS);
    let (pipeline, _) = pipeline(services, 2);

    let result = pipeline
        .process(Some("guide.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    assert_eq!(result.total_chunks, 3);
    assert_eq!(result.total_qa_generated, 0);
    assert!(result.qa_results.is_empty());
}

#[tokio::test]
async fn result_is_written_to_qa_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("qa_log.json");

    let services = Arc::new(
        MockServices::new(THREE_SECTIONS)
            .reply("alpha", 200, envelope(&pairs_json(&[("Q1", "A1")]))),
    );
    let config = IngestionConfig {
        qa_log_path: Some(log_path.clone()),
        ..IngestionConfig::default()
    };
    let pipeline = IngestionPipeline::with_services(config, services);

    let result = pipeline
        .process(Some("guide.pdf"), PDF_BYTES.to_vec())
        .await
        .expect("process");

    let logged: super::IngestionResult =
        serde_json::from_slice(&tokio::fs::read(&log_path).await.expect("read log"))
            .expect("parse log");
    assert_eq!(logged, result);
}
