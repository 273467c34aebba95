use common::{storage::types::qa_pair::QaPair, utils::completion::CompletionResponse};
use serde_json::Value;
use tracing::debug;

/// Default number of characters of the chunk used as the question of a fallback pair.
pub const FALLBACK_QUESTION_CHARS: usize = 50;

/// Turns a completion response into Q&A pairs. Never fails and never returns an
/// empty list: when nothing usable comes back a single fallback pair is built
/// from the start of the chunk, with the model's cleaned text (if any) as answer.
pub fn parse_qa_response(
    response: &CompletionResponse,
    chunk_text: &str,
    question_chars: usize,
) -> Vec<QaPair> {
    parse_qa_json(response.json.as_ref(), chunk_text, question_chars)
}

pub fn parse_qa_json(json: Option<&Value>, chunk_text: &str, question_chars: usize) -> Vec<QaPair> {
    let Some(data) = json.filter(|value| !is_empty_value(value)) else {
        return vec![fallback_pair(chunk_text, String::new(), question_chars)];
    };

    let answer_text = common::utils::completion::envelope_text(data).unwrap_or_default();
    let cleaned = strip_code_fences(answer_text);

    match serde_json::from_str::<Vec<Value>>(cleaned) {
        Ok(items) => {
            let total = items.len();
            let pairs: Vec<QaPair> = items.iter().filter_map(pair_from_item).collect();
            if pairs.len() < total {
                debug!(
                    kept = pairs.len(),
                    dropped = total - pairs.len(),
                    "skipped malformed Q&A items"
                );
            }
            if pairs.is_empty() {
                debug!("model returned no usable Q&A pairs");
                vec![fallback_pair(chunk_text, cleaned.to_string(), question_chars)]
            } else {
                pairs
            }
        }
        Err(err) => {
            debug!(error = %err, "model output is not a Q&A array");
            vec![fallback_pair(chunk_text, cleaned.to_string(), question_chars)]
        }
    }
}

/// One array element as a pair. The question must be a non-blank string; a
/// non-string answer is kept as its JSON text. Items left with a blank
/// question or answer are dropped.
fn pair_from_item(item: &Value) -> Option<QaPair> {
    let question = item.get("question")?.as_str()?;
    if question.trim().is_empty() {
        return None;
    }

    let answer = match item.get("answer")? {
        Value::String(answer) => answer.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    if answer.trim().is_empty() {
        return None;
    }

    Some(QaPair::new(question, answer))
}

/// Removes a leading ```lang marker and a trailing ``` marker, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn fallback_pair(chunk_text: &str, answer: String, question_chars: usize) -> QaPair {
    QaPair {
        question: chunk_text.chars().take(question_chars).collect(),
        answer,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
