use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::embedding::EmbeddingBackend;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_url")]
    pub gemini_url: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_qdrant_host")]
    pub qdrant_host: String,
    #[serde(default)]
    pub qdrant_api_key: Option<String>,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default)]
    pub embedding_model: Option<String>,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_collection")]
    pub default_collection: String,
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,
    #[serde(default = "default_ingest_max_body_bytes")]
    pub ingest_max_body_bytes: usize,
    #[serde(default = "default_chunk_concurrency")]
    pub chunk_concurrency: usize,
    #[serde(default)]
    pub qa_log_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_url: default_gemini_url(),
            llm_timeout_secs: default_llm_timeout_secs(),
            qdrant_host: default_qdrant_host(),
            qdrant_api_key: None,
            http_port: default_http_port(),
            embedding_backend: EmbeddingBackend::default(),
            embedding_model: None,
            embedding_dimensions: default_embedding_dimensions(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            default_collection: default_collection(),
            search_top_k: default_search_top_k(),
            ingest_max_body_bytes: default_ingest_max_body_bytes(),
            chunk_concurrency: default_chunk_concurrency(),
            qa_log_path: None,
        }
    }
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_qdrant_host() -> String {
    "http://localhost:6333".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_embedding_dimensions() -> u32 {
    768
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_collection() -> String {
    "CustomAi".to_string()
}

fn default_search_top_k() -> usize {
    5
}

fn default_ingest_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_chunk_concurrency() -> usize {
    4
}

pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}
