pub mod answer_retrieval;
pub mod knowledge_base;

pub use answer_retrieval::SearchAnswer;
pub use knowledge_base::{KnowledgeBase, QaPage, QaTotal, DEFAULT_PAGE_SIZE};
