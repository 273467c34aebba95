pub mod qdrant;
pub mod types;
pub mod vector_store;
