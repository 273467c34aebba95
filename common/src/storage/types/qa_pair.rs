use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One question paired with one answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A Q&A pair as stored in the vector store, with its vector and point id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: QaPair,
}

impl QaPoint {
    pub fn new(pair: QaPair, vector: Vec<f32>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), pair, vector)
    }

    pub fn with_id(id: String, pair: QaPair, vector: Vec<f32>) -> Self {
        Self {
            id,
            vector,
            payload: pair,
        }
    }
}

/// A stored Q&A returned by listing, without its vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredQa {
    pub id: String,
    pub question: Option<String>,
    pub answer: Option<String>,
}

/// A search hit. The payload is kept as raw JSON so it can be relayed unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredPoint {
    pub id: Value,
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

impl ScoredPoint {
    pub fn question(&self) -> &str {
        self.payload
            .get("question")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn answer(&self) -> &str {
        self.payload
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScrollPage {
    pub points: Vec<StoredQa>,
    pub next_page_offset: Option<Value>,
}
