pub mod qa_pair;
pub mod system_prompts;
