use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    error::AppError,
    storage::{
        types::qa_pair::{QaPoint, ScoredPoint, ScrollPage, StoredQa},
        vector_store::VectorStore,
    },
    utils::config::AppConfig,
};

/// Qdrant over its REST API.
#[derive(Clone)]
pub struct QdrantClient {
    client: reqwest::Client,
    base: Url,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    points_count: Option<u64>,
}

#[derive(Deserialize)]
struct RawScrollPage {
    #[serde(default)]
    points: Vec<RawPoint>,
    #[serde(default)]
    next_page_offset: Option<Value>,
}

#[derive(Deserialize)]
struct RawPoint {
    id: Value,
    #[serde(default)]
    payload: Value,
}

impl QdrantClient {
    pub fn new(host: &str, api_key: Option<String>) -> Result<Self, AppError> {
        let base = Url::parse(host)
            .map_err(|e| AppError::Validation(format!("invalid qdrant host '{host}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "qdrant host '{host}' cannot be used as a base URL"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base,
            api_key,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(&config.qdrant_host, config.qdrant_api_key.clone())
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::VectorStore {
            status: status.as_u16(),
            body,
        })
    }

    async fn exists(&self, segments: &[&str]) -> Result<bool, AppError> {
        let response = self.request(Method::GET, segments).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }
}

/// Qdrant accepts unsigned integers or UUID strings as point ids.
fn offset_value(offset: String) -> Value {
    offset
        .parse::<u64>()
        .map_or_else(|_| Value::String(offset), Value::from)
}

fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl VectorStore for QdrantClient {
    async fn health(&self) -> Result<(), AppError> {
        let response = self.request(Method::GET, &["collections"]).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_collection(&self, name: &str, size: usize) -> Result<Value, AppError> {
        let body = json!({
            "vectors": { "size": size, "distance": "Cosine" }
        });
        let response = self
            .request(Method::PUT, &["collections", name])
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;
        debug!(collection = name, size, "created collection");
        Ok(response.json().await?)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, AppError> {
        self.exists(&["collections", name]).await
    }

    async fn delete_collection(&self, name: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, &["collections", name])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn points_count(&self, name: &str) -> Result<u64, AppError> {
        let response = self
            .request(Method::GET, &["collections", name])
            .send()
            .await?;
        let info: Envelope<CollectionInfo> = Self::check(response).await?.json().await?;
        Ok(info.result.points_count.unwrap_or(0))
    }

    async fn upsert_points(&self, name: &str, points: Vec<QaPoint>) -> Result<Value, AppError> {
        let count = points.len();
        let response = self
            .request(Method::PUT, &["collections", name, "points"])
            .query(&[("wait", "true")])
            .json(&json!({ "points": points }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        debug!(collection = name, count, "upserted points");
        Ok(response.json().await?)
    }

    async fn point_exists(&self, name: &str, id: &str) -> Result<bool, AppError> {
        self.exists(&["collections", name, "points", id]).await
    }

    async fn delete_points(&self, name: &str, ids: Vec<String>) -> Result<(), AppError> {
        let ids: Vec<Value> = ids.into_iter().map(offset_value).collect();
        let response = self
            .request(Method::POST, &["collections", name, "points", "delete"])
            .query(&[("wait", "true")])
            .json(&json!({ "points": ids }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn scroll(
        &self,
        name: &str,
        limit: usize,
        offset: Option<String>,
    ) -> Result<ScrollPage, AppError> {
        let mut body = json!({
            "limit": limit,
            "with_payload": true,
            "with_vector": false
        });
        if let Some(offset) = offset {
            body["offset"] = offset_value(offset);
        }

        let response = self
            .request(Method::POST, &["collections", name, "points", "scroll"])
            .json(&body)
            .send()
            .await?;
        let page: Envelope<RawScrollPage> = Self::check(response).await?.json().await?;

        let points = page
            .result
            .points
            .into_iter()
            .map(|point| StoredQa {
                id: id_string(&point.id),
                question: point
                    .payload
                    .get("question")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                answer: point
                    .payload
                    .get("answer")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            })
            .collect();

        Ok(ScrollPage {
            points,
            next_page_offset: page.result.next_page_offset.filter(|v| !v.is_null()),
        })
    }

    async fn search(
        &self,
        name: &str,
        vector: Vec<f32>,
        top: usize,
    ) -> Result<Vec<ScoredPoint>, AppError> {
        let response = self
            .request(Method::POST, &["collections", name, "points", "search"])
            .json(&json!({
                "vector": vector,
                "limit": top,
                "with_payload": true
            }))
            .send()
            .await?;
        let hits: Envelope<Vec<ScoredPoint>> = Self::check(response).await?.json().await?;
        Ok(hits.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::qa_pair::QaPair;
    use axum::{
        extract::{Path, State},
        http::StatusCode as AxumStatus,
        routing::{get, post, put},
        Json, Router,
    };
    use std::{net::SocketAddr, sync::Arc};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct FakeQdrant {
        bodies: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl FakeQdrant {
        async fn record(&self, route: &str, body: Value) {
            self.bodies.lock().await.push((route.to_string(), body));
        }
    }

    async fn spawn(fake: FakeQdrant) -> SocketAddr {
        let router = Router::new()
            .route(
                "/collections/{name}",
                get(|Path(name): Path<String>| async move {
                    if name == "missing" {
                        (AxumStatus::NOT_FOUND, Json(json!({"status": {"error": "Not found"}})))
                    } else {
                        (AxumStatus::OK, Json(json!({"result": {"points_count": 42}})))
                    }
                })
                .put(
                    |State(fake): State<FakeQdrant>, Json(body): Json<Value>| async move {
                        fake.record("create", body).await;
                        Json(json!({"result": true, "status": "ok"}))
                    },
                ),
            )
            .route(
                "/collections/{name}/points",
                put(
                    |State(fake): State<FakeQdrant>, Json(body): Json<Value>| async move {
                        fake.record("upsert", body).await;
                        Json(json!({"result": {"status": "completed"}, "status": "ok"}))
                    },
                ),
            )
            .route(
                "/collections/{name}/points/scroll",
                post(
                    |State(fake): State<FakeQdrant>, Json(body): Json<Value>| async move {
                        fake.record("scroll", body).await;
                        Json(json!({"result": {
                            "points": [
                                {"id": "p1", "payload": {"question": "Q1", "answer": "A1"}},
                                {"id": 2, "payload": {"question": "Q2"}}
                            ],
                            "next_page_offset": "p3"
                        }}))
                    },
                ),
            )
            .route(
                "/collections/{name}/points/search",
                post(
                    |State(fake): State<FakeQdrant>, Json(body): Json<Value>| async move {
                        fake.record("search", body).await;
                        Json(json!({"result": [
                            {"id": "p1", "score": 0.9, "payload": {"question": "Q1", "answer": "A1"}}
                        ]}))
                    },
                ),
            )
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        addr
    }

    #[test]
    fn numeric_offsets_are_sent_as_numbers() {
        assert_eq!(offset_value("17".into()), json!(17));
        assert_eq!(offset_value("a-uuid".into()), json!("a-uuid"));
    }

    #[test]
    fn invalid_host_is_rejected() {
        assert!(QdrantClient::new("not a url", None).is_err());
    }

    #[tokio::test]
    async fn collection_existence_follows_status_codes() {
        let addr = spawn(FakeQdrant::default()).await;
        let client = QdrantClient::new(&format!("http://{addr}"), None).expect("client");

        assert!(client.collection_exists("faq").await.expect("exists"));
        assert!(!client.collection_exists("missing").await.expect("exists"));
        assert_eq!(client.points_count("faq").await.expect("count"), 42);
    }

    #[tokio::test]
    async fn create_collection_sends_cosine_config() {
        let fake = FakeQdrant::default();
        let addr = spawn(fake.clone()).await;
        let client = QdrantClient::new(&format!("http://{addr}/"), None).expect("client");

        client.create_collection("faq", 768).await.expect("create");

        let bodies = fake.bodies.lock().await;
        let (route, body) = bodies.first().expect("recorded");
        assert_eq!(route, "create");
        assert_eq!(body["vectors"]["size"], 768);
        assert_eq!(body["vectors"]["distance"], "Cosine");
    }

    #[tokio::test]
    async fn upsert_serializes_payload() {
        let fake = FakeQdrant::default();
        let addr = spawn(fake.clone()).await;
        let client = QdrantClient::new(&format!("http://{addr}"), None).expect("client");

        let point = QaPoint::with_id("id-1".into(), QaPair::new("Q", "A"), vec![0.5, 0.5]);
        client.upsert_points("faq", vec![point]).await.expect("upsert");

        let bodies = fake.bodies.lock().await;
        let (_, body) = bodies.first().expect("recorded");
        assert_eq!(body["points"][0]["id"], "id-1");
        assert_eq!(body["points"][0]["payload"]["question"], "Q");
        assert_eq!(body["points"][0]["payload"]["answer"], "A");
    }

    #[tokio::test]
    async fn scroll_maps_points_and_offset() {
        let fake = FakeQdrant::default();
        let addr = spawn(fake.clone()).await;
        let client = QdrantClient::new(&format!("http://{addr}"), None).expect("client");

        let page = client
            .scroll("faq", 25, Some("p0".into()))
            .await
            .expect("scroll");

        assert_eq!(page.points.len(), 2);
        assert_eq!(page.points[0].question.as_deref(), Some("Q1"));
        assert_eq!(page.points[1].id, "2");
        assert_eq!(page.points[1].answer, None);
        assert_eq!(page.next_page_offset, Some(json!("p3")));

        let bodies = fake.bodies.lock().await;
        let (_, body) = bodies.first().expect("recorded");
        assert_eq!(body["limit"], 25);
        assert_eq!(body["offset"], "p0");
        assert_eq!(body["with_vector"], false);
    }

    #[tokio::test]
    async fn search_returns_scored_points() {
        let addr = spawn(FakeQdrant::default()).await;
        let client = QdrantClient::new(&format!("http://{addr}"), None).expect("client");

        let hits = client.search("faq", vec![0.1, 0.2], 5).await.expect("search");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].question(), "Q1");
    }

    #[tokio::test]
    async fn error_status_becomes_vector_store_error() {
        let addr = spawn(FakeQdrant::default()).await;
        let client = QdrantClient::new(&format!("http://{addr}"), None).expect("client");

        let err = client.delete_collection("faq").await.expect_err("no route");
        assert!(matches!(err, AppError::VectorStore { status: 405, .. }));
    }
}
