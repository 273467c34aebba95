use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::AppError,
    storage::types::qa_pair::{QaPoint, ScoredPoint, ScrollPage},
};

/// Collection and point operations the service needs from a vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn health(&self) -> Result<(), AppError>;

    /// Creates a cosine-distance collection of `size`-dimensional vectors.
    async fn create_collection(&self, name: &str, size: usize) -> Result<Value, AppError>;

    async fn collection_exists(&self, name: &str) -> Result<bool, AppError>;

    async fn delete_collection(&self, name: &str) -> Result<(), AppError>;

    async fn points_count(&self, name: &str) -> Result<u64, AppError>;

    /// Inserts or overwrites points by id.
    async fn upsert_points(&self, name: &str, points: Vec<QaPoint>) -> Result<Value, AppError>;

    async fn point_exists(&self, name: &str, id: &str) -> Result<bool, AppError>;

    async fn delete_points(&self, name: &str, ids: Vec<String>) -> Result<(), AppError>;

    async fn scroll(
        &self,
        name: &str,
        limit: usize,
        offset: Option<String>,
    ) -> Result<ScrollPage, AppError>;

    async fn search(
        &self,
        name: &str,
        vector: Vec<f32>,
        top: usize,
    ) -> Result<Vec<ScoredPoint>, AppError>;
}
