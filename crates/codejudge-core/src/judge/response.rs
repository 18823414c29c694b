//! Turning raw judge output into a JSON document

use crate::error::{JudgeError, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("fence regex is valid")
    })
}

/// Content of the first fenced code block, or the trimmed text itself
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// The span from the first `{` to the last `}`
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse `text` as a JSON document.
///
/// The whole text is tried first, so fences quoted inside JSON strings are
/// left alone. Then the content of a wrapping fence, then the outermost
/// `{...}` span.
fn parse_document(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(JudgeError::response_parse("empty response"));
    }

    let first_error = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let body = strip_code_fence(trimmed);
    if body != trimmed {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return Ok(value);
        }
    }

    [body, trimmed]
        .into_iter()
        .filter_map(outermost_object)
        .find_map(|object| serde_json::from_str::<Value>(object).ok())
        .ok_or_else(|| JudgeError::response_parse(first_error))
}

/// CLI result envelopes carry the model's text in a `result` string
fn unwrap_envelope(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    let is_envelope = object.get("type").and_then(Value::as_str) == Some("result")
        || (object.contains_key("result") && object.contains_key("session_id"));
    if !is_envelope {
        return None;
    }
    object.get("result").and_then(Value::as_str)
}

/// Parse judge output into a JSON object.
///
/// Valid JSON is taken as is. Otherwise a wrapping fence is stripped and
/// stray prose around a single object is tolerated. A CLI result envelope is
/// unwrapped once and its text parsed the same way.
pub fn parse_response(text: &str) -> Result<Value> {
    let mut value = parse_document(text)?;

    if let Some(inner) = unwrap_envelope(&value) {
        if value.get("is_error").and_then(Value::as_bool) == Some(true) {
            return Err(JudgeError::response_parse(format!(
                "judge reported an error: {}",
                inner
            )));
        }
        value = parse_document(inner)?;
    }

    if !value.is_object() {
        return Err(JudgeError::response_parse(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = parse_response(r#"{"base_score": 4}"#).unwrap();
        assert_eq!(value["base_score"], 4);
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"base_score\": 3, \"modifier\": \"weak\"}\n```";
        let value = parse_response(text).unwrap();
        assert_eq!(value["modifier"], "weak");
    }

    #[test]
    fn test_bare_fence() {
        let value = parse_response("```\n{\"a\": 1}\n```\n").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_surrounding_prose_tolerated() {
        let value = parse_response("Here you go:\n{\"a\": 1}\nThanks").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_envelope_unwrapped() {
        let inner = "```json\n{\"base_score\": 5}\n```";
        let envelope = serde_json::json!({
            "type": "result",
            "subtype": "success",
            "is_error": false,
            "result": inner,
        });
        let value = parse_response(&envelope.to_string()).unwrap();
        assert_eq!(value["base_score"], 5);
    }

    #[test]
    fn test_fence_quoted_in_string_is_kept() {
        let text = r#"{"base_score": 4, "justification": "see ```py\nx = 1\n``` above"}"#;
        let value = parse_response(text).unwrap();
        assert_eq!(value["base_score"], 4);
        assert!(value["justification"].as_str().unwrap().contains("x = 1"));
    }

    #[test]
    fn test_fenced_json_quoting_a_fence() {
        let text = "```json\n{\"base_score\": 2, \"justification\": \"uses ```sh``` blocks\"}\n```";
        let value = parse_response(text).unwrap();
        assert_eq!(value["base_score"], 2);
    }

    #[test]
    fn test_envelope_error_rejected() {
        let envelope = serde_json::json!({
            "type": "result",
            "is_error": true,
            "result": "rate limited",
        });
        let err = parse_response(&envelope.to_string()).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        for text in ["", "   ", "not json at all", "{broken", "[1, 2]", "42"] {
            let err = parse_response(text).unwrap_err();
            assert!(
                matches!(err, JudgeError::ResponseParse { .. }),
                "{text:?} gave {err:?}"
            );
        }
    }
}
