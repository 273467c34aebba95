use std::sync::Arc;

use common::{
    error::AppError,
    storage::{
        types::qa_pair::{QaPair, QaPoint, StoredQa},
        vector_store::VectorStore,
    },
    utils::{completion::CompletionProvider, embedding::Embedder},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::answer_retrieval::{create_answer_prompt, SearchAnswer};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// One page of stored Q&A plus the collection's total size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaPage {
    pub total_points: u64,
    pub fetched: usize,
    pub next_page_offset: Option<Value>,
    pub qa_list: Vec<StoredQa>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaTotal {
    pub collection: String,
    pub total_qa: u64,
}

/// Q&A storage and retrieval on top of a vector store. Questions are embedded,
/// answers ride along in the point payload.
pub struct KnowledgeBase {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    completion: Arc<dyn CompletionProvider>,
    top_k: usize,
}

impl KnowledgeBase {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        completion: Arc<dyn CompletionProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            completion,
            top_k: top_k.max(1),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_collection(&self, name: &str) -> Result<Value, AppError> {
        let name = require("Collection name", name)?;
        let size = self.embedder.dimension();
        let response = self.store.create_collection(name, size).await?;
        info!(collection = name, size, "created collection");
        Ok(response)
    }

    /// Stores one pair under a fresh id. The collection has to exist already.
    #[instrument(skip(self, question, answer))]
    pub async fn insert_qa(
        &self,
        collection: &str,
        question: &str,
        answer: &str,
    ) -> Result<String, AppError> {
        let collection = require("Collection name", collection)?;
        let question = require("Question", question)?;

        if !self.store.collection_exists(collection).await? {
            return Err(AppError::Validation(format!(
                "Collection '{collection}' does not exist."
            )));
        }

        let vector = self.embedder.embed(question).await?;
        let point = QaPoint::new(QaPair::new(question, answer), vector);
        let id = point.id.clone();
        self.store.upsert_points(collection, vec![point]).await?;

        debug!(collection, %id, "inserted Q&A");
        Ok(id)
    }

    /// Embeds every question in one batch and writes all points in one upsert.
    #[instrument(skip(self, pairs), fields(count = pairs.len()))]
    pub async fn bulk_insert(
        &self,
        collection: &str,
        pairs: Vec<QaPair>,
    ) -> Result<usize, AppError> {
        let collection = require("Collection name", collection)?;
        if pairs.is_empty() {
            return Err(AppError::Validation("No items provided".into()));
        }

        let questions = pairs.iter().map(|pair| pair.question.clone()).collect();
        let vectors = self.embedder.embed_batch(questions).await?;

        let points: Vec<QaPoint> = pairs
            .into_iter()
            .zip(vectors)
            .map(|(pair, vector)| QaPoint::new(pair, vector))
            .collect();
        let inserted = points.len();
        self.store.upsert_points(collection, points).await?;

        info!(collection, inserted, "bulk inserted Q&A");
        Ok(inserted)
    }

    /// Re-embeds the question and overwrites the point stored under `id`.
    #[instrument(skip(self, question, answer))]
    pub async fn update_qa(
        &self,
        collection: &str,
        id: &str,
        question: &str,
        answer: &str,
    ) -> Result<Value, AppError> {
        let collection = require("Collection name", collection)?;
        let id = require("id", id)?;
        let question = require("Question", question)?;

        let vector = self.embedder.embed(question).await?;
        let point = QaPoint::with_id(id.to_string(), QaPair::new(question, answer), vector);
        let response = self.store.upsert_points(collection, vec![point]).await?;

        debug!(collection, id, "updated Q&A");
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn delete_question(&self, collection: &str, id: &str) -> Result<(), AppError> {
        let collection = require("Collection name", collection)?;
        let id = require("questionId", id)?;

        if !self.store.point_exists(collection, id).await? {
            return Err(AppError::NotFound(format!(
                "Question with id '{id}' not found in collection '{collection}'"
            )));
        }

        self.store.delete_points(collection, vec![id.to_string()]).await?;
        debug!(collection, id, "deleted Q&A");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<(), AppError> {
        let name = require("Collection name", name)?;

        if !self.store.collection_exists(name).await? {
            return Err(AppError::NotFound(format!(
                "Collection '{name}' not found in QDRANT Collection"
            )));
        }

        self.store.delete_collection(name).await?;
        info!(collection = name, "deleted collection");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_qa(
        &self,
        collection: &str,
        limit: usize,
        offset: Option<String>,
    ) -> Result<QaPage, AppError> {
        let collection = require("Collection name", collection)?;
        let total_points = self.store.points_count(collection).await?;
        let offset = offset.filter(|o| !o.trim().is_empty());
        let page = self.store.scroll(collection, limit.max(1), offset).await?;

        Ok(QaPage {
            total_points,
            fetched: page.points.len(),
            next_page_offset: page.next_page_offset,
            qa_list: page.points,
        })
    }

    #[instrument(skip(self))]
    pub async fn total_qa(&self, collection: &str) -> Result<QaTotal, AppError> {
        let collection = require("Collection name", collection)?;
        let total_qa = self.store.points_count(collection).await?;
        Ok(QaTotal {
            collection: collection.to_string(),
            total_qa,
        })
    }

    /// Retrieves the closest stored pairs and asks the LLM to phrase an answer
    /// from them. No hits short-circuits to the `"0"` sentinel without an LLM call.
    #[instrument(skip(self, query), fields(query_chars = query.chars().count()))]
    pub async fn search_and_answer(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<SearchAnswer, AppError> {
        let collection = require("Collection name", collection)?;
        let query = require("Query", query)?;

        let vector = self.embedder.embed(query).await?;
        let hits = self.store.search(collection, vector, self.top_k).await?;

        if hits.is_empty() {
            info!(collection, "no matched points for query");
            return Ok(SearchAnswer::no_match(query));
        }

        let prompt = create_answer_prompt(query, &hits);
        let answer = self.completion.answer(&prompt).await?;

        let result = SearchAnswer::matched(query, answer.answer, hits);
        info!(
            collection,
            hits = result.top_points.len(),
            unanswered = result.is_unanswered(),
            "answered query from stored Q&A"
        );
        Ok(result)
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}
