//! Best-effort unwrapping of heterogeneous backend replies into display text.
//!
//! Matchers run in the order of [`SHAPE_MATCHERS`]; the first one producing
//! non-empty text wins. That order is part of the contract: a record carrying
//! both `response` and `message` yields `response`.

use serde_json::Value;

/// Body of a successful backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Json(Value),
    Text(String),
}

impl RawResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RawResponse::Json(value) => Some(value),
            RawResponse::Text(_) => None,
        }
    }
}

impl From<&str> for RawResponse {
    fn from(text: &str) -> Self {
        RawResponse::Text(text.to_string())
    }
}

type ShapeMatcher = fn(&RawResponse) -> Option<String>;

/// Ordered reply shapes.
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("plain string", plain_string),
    ("response field", response_field),
    ("message string", message_string),
    ("message.content string", message_content_string),
    ("message.content parts", message_content_parts),
];

const PART_SEPARATOR: &str = "\n\n";

/// Extract display text. Total: unknown shapes give an empty string.
pub fn extract(raw: &RawResponse) -> String {
    SHAPE_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(raw).filter(|text| !text.is_empty()))
        .unwrap_or_default()
}

/// Name of the shape that matched, for diagnostics.
pub fn matched_shape(raw: &RawResponse) -> Option<&'static str> {
    SHAPE_MATCHERS
        .iter()
        .find(|(_, matcher)| matcher(raw).is_some_and(|text| !text.is_empty()))
        .map(|(name, _)| *name)
}

fn trimmed(text: &str) -> String {
    text.trim().to_string()
}

fn plain_string(raw: &RawResponse) -> Option<String> {
    match raw {
        RawResponse::Text(text) => Some(trimmed(text)),
        RawResponse::Json(Value::String(text)) => Some(trimmed(text)),
        RawResponse::Json(_) => None,
    }
}

fn response_field(raw: &RawResponse) -> Option<String> {
    raw.as_json()?
        .get("response")
        .and_then(Value::as_str)
        .map(trimmed)
}

fn message_string(raw: &RawResponse) -> Option<String> {
    raw.as_json()?.get("message").and_then(Value::as_str).map(trimmed)
}

fn message_content(raw: &RawResponse) -> Option<&Value> {
    raw.as_json()?.get("message")?.get("content")
}

fn message_content_string(raw: &RawResponse) -> Option<String> {
    message_content(raw).and_then(Value::as_str).map(trimmed)
}

fn message_content_parts(raw: &RawResponse) -> Option<String> {
    let parts = message_content(raw)?.as_array()?;
    let joined = parts
        .iter()
        .filter_map(part_text)
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR);
    Some(trimmed(&joined))
}

// Strings are used verbatim; content-part records contribute `text` or `text.value`.
fn part_text(part: &Value) -> Option<&str> {
    match part {
        Value::String(text) => Some(text),
        Value::Object(_) => {
            let text = part.get("text")?;
            text.as_str()
                .or_else(|| text.get("value").and_then(Value::as_str))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_body_is_trimmed() {
        assert_eq!(extract(&RawResponse::from("  hi there \n")), "hi there");
    }

    #[test]
    fn json_string_body_is_trimmed() {
        assert_eq!(extract(&RawResponse::Json(json!(" ok "))), "ok");
    }

    #[test]
    fn response_field_wins_over_message() {
        let raw = RawResponse::Json(json!({"response": " first ", "message": "second"}));
        assert_eq!(extract(&raw), "first");
        assert_eq!(matched_shape(&raw), Some("response field"));
    }

    #[test]
    fn message_string_shape() {
        let raw = RawResponse::Json(json!({"message": "\nplain message\n"}));
        assert_eq!(extract(&raw), "plain message");
    }

    #[test]
    fn message_content_string_shape() {
        let raw = RawResponse::Json(json!({"message": {"role": "assistant", "content": " body "}}));
        assert_eq!(extract(&raw), "body");
    }

    #[test]
    fn message_content_array_is_joined_with_blank_line() {
        let raw = RawResponse::Json(json!({"message": {"content": ["a", "b"]}}));
        assert_eq!(extract(&raw), "a\n\nb");
    }

    #[test]
    fn content_parts_records_contribute_their_text() {
        let raw = RawResponse::Json(json!({"message": {"content": [
            {"type": "text", "text": {"value": "first", "annotations": []}},
            {"type": "text", "text": "second"},
            {"type": "image_file", "image_file": {"file_id": "f"}},
            42
        ]}}));
        assert_eq!(extract(&raw), "first\n\nsecond");
    }

    #[test]
    fn blank_response_falls_through_to_message() {
        let raw = RawResponse::Json(json!({"response": "   ", "message": "fallback"}));
        assert_eq!(extract(&raw), "fallback");
    }

    #[test]
    fn unknown_shapes_yield_empty_string() {
        for value in [
            json!(null),
            json!(17),
            json!([]),
            json!({"choices": []}),
            json!({"message": {"content": 3}}),
        ] {
            assert_eq!(extract(&RawResponse::Json(value)), "");
        }
        assert_eq!(matched_shape(&RawResponse::Json(json!({}))), None);
    }

    #[test]
    fn extraction_is_idempotent_on_extracted_text() {
        let raw = RawResponse::Json(json!({"message": {"content": ["  a", "b  "]}}));
        let once = extract(&raw);
        let twice = extract(&RawResponse::Text(once.clone()));
        assert_eq!(once, twice);
    }
}
