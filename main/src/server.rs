use std::sync::Arc;

use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::{
    storage::qdrant::QdrantClient,
    utils::{
        completion::GeminiClient,
        config::get_config,
        embedding::{Embedder, EmbeddingProvider},
    },
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    // Create embedding provider based on config
    let embedding_provider = Arc::new(EmbeddingProvider::from_config(&config).await?);
    info!(
        embedding_backend = embedding_provider.backend_label(),
        embedding_model = ?embedding_provider.model_code(),
        embedding_dimension = embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    let completion = Arc::new(GeminiClient::from_config(&config)?);
    let vector_store = Arc::new(QdrantClient::from_config(&config)?);
    info!(qdrant_host = %config.qdrant_host, "Vector store client initialized");

    let api_state = ApiState::new(&config, embedding_provider, completion, vector_store);

    // Create Axum router
    let app = Router::new()
        .merge(api_routes(&api_state))
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
