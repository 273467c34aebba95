use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post, put},
    Router,
};
use routes::{
    ask::ask_question,
    collections::{
        bulk_qa_insert, create_collection, delete_collection, delete_question_by_id,
        get_qas_paginated, insert_qa, search, total_qa, update_qa,
    },
    embed::embed_text,
    liveness::live,
    readiness::ready,
    upload::upload_pdf,
};
use tower_http::cors::CorsLayer;

pub mod api_state;
pub mod error;
mod routes;

/// Router for the Q&A service: probes, PDF ingestion, direct LLM and
/// embedding access, and knowledge-base management under `/qdrantapi`.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public, unauthenticated endpoints (for k8s/systemd probes)
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let knowledge_base = Router::new()
        .route("/create_collection", post(create_collection))
        .route("/insert_Q&A", post(insert_qa))
        .route("/search", post(search))
        .route("/getQAsPaginated", get(get_qas_paginated))
        .route("/delete_collection", delete(delete_collection))
        .route("/deleteQuestionById", delete(delete_question_by_id))
        .route("/bulk_qa_insert", post(bulk_qa_insert))
        .route("/update_QA", put(update_qa))
        .route("/total_QA", get(total_qa));

    let service = Router::new()
        .route(
            "/upload/",
            post(upload_pdf).layer(DefaultBodyLimit::max(
                app_state.config.ingest_max_body_bytes,
            )),
        )
        .route("/ask/", post(ask_question))
        .route("/api/vectorEmbed", post(embed_text))
        .nest("/qdrantapi", knowledge_base);

    probes.merge(service).layer(CorsLayer::permissive())
}
