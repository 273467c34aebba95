/// Instruction wrapped around every chunk sent for Q&A extraction.
/// `{text}` is replaced verbatim with the chunk body.
pub static DEFAULT_QA_EXTRACTION_PROMPT: &str = r#"You are a Q&A extractor.

Given the following text:

---
{text}
---

Extract ALL possible question and answer pairs from the text.

Return them strictly in JSON array format like this:
[
{"question": "<q1>", "answer": "<a1>"},
{"question": "<q2>", "answer": "<a2>"}
]

Rules:
- Include as many Q&A pairs as are reasonably supported by the text.
- Do not add explanations, commentary, or extra text.
- Do not wrap the output in markdown or code fences.
- Return only valid JSON."#;

/// Preamble for turning retrieved Q&A pairs into a conversational answer.
pub static DEFAULT_ANSWER_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Based on the following Q&A pairs, answer the user's question in a clear, human-like way. If the answer is not clear then reply with a single 0 and nothing else.";

/// Sentinel the answering model returns when the retrieved pairs do not answer the question.
pub static NO_ANSWER_SENTINEL: &str = "0";
