use std::sync::Arc;

use common::{
    storage::vector_store::VectorStore,
    utils::{completion::CompletionProvider, config::AppConfig, embedding::Embedder},
};
use ingestion_pipeline::{IngestionConfig, IngestionPipeline};
use retrieval_pipeline::KnowledgeBase;

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub ingestion: Arc<IngestionPipeline>,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub embedder: Arc<dyn Embedder>,
    pub completion: Arc<dyn CompletionProvider>,
    pub vector_store: Arc<dyn VectorStore>,
}

impl ApiState {
    /// Wires the pipelines from already-constructed collaborators.
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        let ingestion = Arc::new(IngestionPipeline::new(
            Arc::clone(&completion),
            IngestionConfig::from_app_config(config),
        ));
        let knowledge_base = Arc::new(KnowledgeBase::new(
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
            Arc::clone(&completion),
            config.search_top_k,
        ));

        Self {
            config: config.clone(),
            ingestion,
            knowledge_base,
            embedder,
            completion,
            vector_store,
        }
    }
}
