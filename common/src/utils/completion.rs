use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::{error::AppError, utils::config::AppConfig};

/// Raw outcome of a single completion call.
///
/// The HTTP status is carried as-is; interpreting non-2xx codes is up to the caller.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub status: u16,
    pub raw: String,
    pub json: Option<Value>,
}

impl CompletionResponse {
    pub fn from_body(status: u16, raw: String) -> Self {
        let json = serde_json::from_str(&raw).ok();
        Self { status, raw, json }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The model's text at `candidates[0].content.parts[0].text`, if present.
    pub fn text(&self) -> Option<&str> {
        self.json.as_ref().and_then(envelope_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResult {
    pub question: String,
    pub answer: String,
}

pub fn envelope_text(value: &Value) -> Option<&str> {
    value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends one prompt. Fails only when no HTTP response could be obtained.
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AppError>;

    /// Single-question path: the response must be a 2xx carrying the expected envelope.
    async fn answer(&self, question: &str) -> Result<AskResult, AppError> {
        let response = self.complete(question).await?;

        if !response.is_success() {
            return Err(AppError::LlmStatus {
                status: response.status,
                body: response.raw,
            });
        }

        let answer = response
            .text()
            .ok_or_else(|| {
                AppError::Llm("missing candidates[0].content.parts[0].text in response".into())
            })?
            .to_string();

        Ok(AskResult {
            question: question.to_string(),
            answer,
        })
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.gemini_url.clone(),
            config.gemini_api_key.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                { "parts": [{ "text": prompt }] }
            ]
        })
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AppError> {
        let body = Self::build_request_body(prompt);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let raw = response.text().await?;

        debug!(status, body_bytes = raw.len(), "completion call returned");

        Ok(CompletionResponse::from_body(status, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use std::net::SocketAddr;

    async fn spawn(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> GeminiClient {
        GeminiClient::new(
            format!("http://{addr}/generate"),
            "test-key".into(),
            Duration::from_secs(5),
        )
        .expect("client")
    }

    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        let prompt = body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_uppercase();
        (
            StatusCode::OK,
            Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": prompt }] } }]
            })),
        )
    }

    #[test]
    fn request_body_wraps_prompt_in_contents() {
        let body = GeminiClient::build_request_body("hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn unparsable_body_yields_no_json() {
        let response = CompletionResponse::from_body(502, "<html>bad gateway</html>".into());
        assert!(response.json.is_none());
        assert!(!response.is_success());
        assert_eq!(response.text(), None);
    }

    #[tokio::test]
    async fn complete_returns_status_raw_and_json() {
        let addr = spawn(Router::new().route("/generate", post(echo))).await;
        let client = client_for(addr);

        let response = client.complete("ping").await.expect("complete");

        assert_eq!(response.status, 200);
        assert!(response.raw.contains("PING"));
        assert_eq!(response.text(), Some("PING"));
    }

    #[tokio::test]
    async fn answer_extracts_envelope_text() {
        let addr = spawn(Router::new().route("/generate", post(echo))).await;
        let client = client_for(addr);

        let result = client.answer("what is ai?").await.expect("answer");

        assert_eq!(result.question, "what is ai?");
        assert_eq!(result.answer, "WHAT IS AI?");
    }

    #[tokio::test]
    async fn answer_rejects_non_success_status() {
        let router = Router::new().route(
            "/generate",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, Json(json!({"error": "quota"}))) }),
        );
        let addr = spawn(router).await;
        let client = client_for(addr);

        let err = client.answer("q").await.expect_err("should fail");
        assert!(matches!(err, AppError::LlmStatus { status: 429, .. }));
    }

    #[tokio::test]
    async fn answer_rejects_missing_envelope() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(json!({"candidates": []})) }),
        );
        let addr = spawn(router).await;
        let client = client_for(addr);

        let err = client.answer("q").await.expect_err("should fail");
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn complete_does_not_fail_on_error_status() {
        let router = Router::new().route(
            "/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let addr = spawn(router).await;
        let client = client_for(addr);

        let response = client.complete("q").await.expect("complete");
        assert_eq!(response.status, 500);
        assert_eq!(response.raw, "boom");
        assert!(response.json.is_none());
    }
}
