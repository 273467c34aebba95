pub mod chunker;
pub mod llm_instructions;
pub mod pdf_ingestion;
pub mod qa_log;
pub mod response_parser;
