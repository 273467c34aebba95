use common::storage::types::system_prompts::DEFAULT_QA_EXTRACTION_PROMPT;

/// Wraps a chunk in the Q&A extraction instruction. The chunk text is embedded
/// verbatim, with no size limiting.
pub fn build_qa_prompt(text: &str) -> String {
    DEFAULT_QA_EXTRACTION_PROMPT.replace("{text}", text)
}
