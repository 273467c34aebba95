use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use common::storage::types::qa_pair::QaPair;
use retrieval_pipeline::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use serde_json::json;

use crate::{api_state::ApiState, error::ApiError};

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::ValidationError(message.to_string()))
}

fn or_default_collection(state: &ApiState, value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.config.default_collection.clone())
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn create_collection(
    State(state): State<ApiState>,
    Json(body): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = required(body.name, "Collection name required")?;
    let response = state.knowledge_base.create_collection(&name).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct CollectionNameQuery {
    #[serde(default)]
    pub collection_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InsertQaRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

pub async fn insert_qa(
    State(state): State<ApiState>,
    Query(params): Query<CollectionNameQuery>,
    Json(body): Json<InsertQaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = or_default_collection(&state, params.collection_name);
    let question = required(body.question, "question and answer are required")?;
    let answer = body.answer.unwrap_or_default();

    let id = state
        .knowledge_base
        .insert_qa(&collection, &question, &answer)
        .await?;

    Ok(Json(json!({
        "status": "ok",
        "collection": collection,
        "id": id
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
}

pub async fn search(
    State(state): State<ApiState>,
    Json(body): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = required(body.query, "query is required")?;
    let collection = or_default_collection(&state, body.collection);

    let answer = state
        .knowledge_base
        .search_and_answer(&collection, &query)
        .await?;

    Ok(Json(answer))
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<String>,
}

pub async fn get_qas_paginated(
    State(state): State<ApiState>,
    Query(params): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = or_default_collection(&state, params.collection);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let page = state
        .knowledge_base
        .list_qa(&collection, limit, params.offset)
        .await?;

    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct DeleteCollectionQuery {
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn delete_collection(
    State(state): State<ApiState>,
    Query(params): Query<DeleteCollectionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let name = required(params.name, "Collection name is required")?;
    state.knowledge_base.delete_collection(&name).await?;

    Ok(Json(json!({
        "message": format!("Collection '{name}' removed successfully")
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuestionQuery {
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default, rename = "questionId")]
    pub question_id: Option<String>,
}

pub async fn delete_question_by_id(
    State(state): State<ApiState>,
    Query(params): Query<DeleteQuestionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = or_default_collection(&state, params.collection_name);
    let question_id = required(params.question_id, "questionId is required")?;

    state
        .knowledge_base
        .delete_question(&collection, &question_id)
        .await?;

    Ok(Json(json!({
        "message": format!(
            "Question with id '{question_id}' deleted successfully from collection '{collection}'"
        )
    })))
}

#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    #[serde(default)]
    pub collection: Option<String>,
}

pub async fn bulk_qa_insert(
    State(state): State<ApiState>,
    Query(params): Query<CollectionQuery>,
    Json(pairs): Json<Vec<QaPair>>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = required(params.collection, "Collection name is required")?;
    let inserted_count = state.knowledge_base.bulk_insert(&collection, pairs).await?;

    Ok(Json(json!({
        "collection": collection,
        "inserted_count": inserted_count
    })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQaRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

pub async fn update_qa(
    State(state): State<ApiState>,
    Query(params): Query<CollectionNameQuery>,
    Json(body): Json<UpdateQaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = required(params.collection_name, "Collection name is required")?;
    let (Some(id), Some(question), Some(answer)) = (body.id, body.question, body.answer) else {
        return Err(ApiError::ValidationError(
            "id, question, and answer are required".to_string(),
        ));
    };

    let response = state
        .knowledge_base
        .update_qa(&collection, &id, &question, &answer)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Point {id} updated successfully in collection {collection}"),
        "qdrant_response": response
    })))
}

pub async fn total_qa(
    State(state): State<ApiState>,
    Query(params): Query<CollectionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = required(params.collection, "Collection name is required")?;
    let total = state.knowledge_base.total_qa(&collection).await?;
    Ok(Json(total))
}
