//! JSON extraction from free-text model replies.
//!
//! Model output is untrusted text. Extraction is forgiving about the noise
//! around the payload and strict about the payload itself:
//!
//! 1. If a "```json" fence is opened, the text up to the next "```" is
//!    taken. A fence that is never closed yields no payload.
//! 2. Without an opening fence, the span from the first `{` to the last `}`
//!    is taken.
//! 3. Otherwise there is no payload.
//!
//! The chosen candidate must parse as JSON. There is exactly one extraction
//! attempt per reply; a candidate that fails to parse is never retried with
//! another strategy.
//!
//! The brace fallback is deliberately not brace-balanced. It maximizes the
//! captured span, so two independent objects in one reply, or a stray `}`
//! in trailing prose, produce an invalid candidate and a
//! [`MalformedResponse`].

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::types::ParsedResponse;

/// Marker that opens a fenced JSON block.
pub const FENCE_OPEN: &str = "```json";

/// Marker that closes a fenced block.
pub const FENCE_CLOSE: &str = "```";

/// A reply from which no well-formed JSON object could be recovered.
#[derive(Error, Debug)]
pub enum MalformedResponse {
    #[error("Response does not contain a JSON payload")]
    NoPayload,

    #[error("Response does not contain valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Response JSON is not an object (found {found})")]
    NotAnObject { found: &'static str },
}

/// Extract the JSON text embedded in a raw model reply.
///
/// Returns a trimmed substring of `raw` that is known to parse as JSON.
pub fn sanitize(raw: &str) -> Result<&str, MalformedResponse> {
    let candidate = locate_candidate(raw).ok_or(MalformedResponse::NoPayload)?;

    if candidate.is_empty() {
        return Err(MalformedResponse::NoPayload);
    }

    serde_json::from_str::<JsonValue>(candidate)?;
    Ok(candidate)
}

/// Parse sanitized text into an object.
///
/// Scalars and arrays at the top level are rejected.
pub fn parse_object(text: &str) -> Result<ParsedResponse, MalformedResponse> {
    match serde_json::from_str::<JsonValue>(text)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(MalformedResponse::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// Sanitize a raw reply and parse the result as an object.
pub fn extract_object(raw: &str) -> Result<ParsedResponse, MalformedResponse> {
    parse_object(sanitize(raw)?)
}

fn locate_candidate(raw: &str) -> Option<&str> {
    if let Some(open) = raw.find(FENCE_OPEN) {
        // An opened fence commits to the fenced strategy, closed or not.
        let fenced = fenced_body(raw, open + FENCE_OPEN.len());
        if fenced.is_none() {
            tracing::trace!(open, "Fenced JSON block is never closed");
        }
        return fenced.map(str::trim);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start < end {
        tracing::trace!(start, end, "Using brace span");
        Some(raw[start..=end].trim())
    } else {
        None
    }
}

/// Text from `body_start` up to the first closing fence after it.
fn fenced_body(raw: &str, body_start: usize) -> Option<&str> {
    let body_len = raw[body_start..].find(FENCE_CLOSE)?;
    Some(&raw[body_start..body_start + body_len])
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_fenced_block_with_prose() {
        let raw = "Here you go:\n```json\n{\"validationResult\": true}\n```\nLet me know!";
        assert_eq!(sanitize(raw).unwrap(), "{\"validationResult\": true}");
    }

    #[test]
    fn test_fence_takes_precedence_over_braces() {
        let raw = "{not json} ```json\n{\"a\": 1}\n``` {also not json}";
        assert_eq!(sanitize(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_does_not_fall_back_when_invalid() {
        // The brace span would parse, but the fence wins and is invalid.
        let raw = "```json\nnot json\n```\n{\"a\": 1}";
        assert!(matches!(sanitize(raw), Err(MalformedResponse::InvalidJson(_))));
    }

    #[test]
    fn test_unclosed_fence_is_no_payload() {
        // The brace span would parse, but an opened fence is never abandoned.
        let raw = "Here you go:\n```json\n{\"validationResult\": true}";
        assert!(matches!(sanitize(raw), Err(MalformedResponse::NoPayload)));
        assert!(extract_object(raw).is_err());
    }

    #[test]
    fn test_empty_fence_is_no_payload() {
        let raw = "```json\n   \n```";
        assert!(matches!(sanitize(raw), Err(MalformedResponse::NoPayload)));
    }

    #[test]
    fn test_brace_span_with_prose() {
        let raw = "Sure, the answer is {\"next\": \"question\", \"response\": \"Where to?\"} hope that helps";
        let extracted = sanitize(raw).unwrap();
        assert_eq!(extracted, "{\"next\": \"question\", \"response\": \"Where to?\"}");
    }

    #[test]
    fn test_brace_span_keeps_nested_objects() {
        let raw = "Result: {\"outer\": {\"inner\": [1, {\"x\": 2}]}} done";
        let parsed = extract_object(raw).unwrap();
        assert_eq!(parsed["outer"]["inner"][1]["x"], 2);
    }

    #[test]
    fn test_two_objects_are_not_split() {
        let raw = "{\"a\": 1} and also {\"b\": 2}";
        assert!(matches!(sanitize(raw), Err(MalformedResponse::InvalidJson(_))));
    }

    #[test]
    fn test_no_braces_fails() {
        assert!(matches!(sanitize("Sure! "), Err(MalformedResponse::NoPayload)));
    }

    #[test]
    fn test_no_closing_brace_fails() {
        assert!(matches!(sanitize("{\"a\": 1"), Err(MalformedResponse::NoPayload)));
    }

    #[test]
    fn test_reversed_braces_fail() {
        assert!(matches!(sanitize("} nothing here {"), Err(MalformedResponse::NoPayload)));
    }

    #[test]
    fn test_empty_and_whitespace_input_fail() {
        assert!(matches!(sanitize(""), Err(MalformedResponse::NoPayload)));
        assert!(matches!(sanitize("  \n\t "), Err(MalformedResponse::NoPayload)));
    }

    #[test]
    fn test_parse_object_rejects_array() {
        let result = parse_object("[1, 2, 3]");
        assert!(matches!(result, Err(MalformedResponse::NotAnObject { found: "array" })));
    }

    #[test]
    fn test_fenced_array_sanitizes_but_is_not_an_object() {
        let raw = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(sanitize(raw).unwrap(), "[{\"a\": 1}]");
        assert!(matches!(extract_object(raw), Err(MalformedResponse::NotAnObject { .. })));
    }

    #[test]
    fn test_extract_object_round_trip() {
        let raw = "```json\n{\"validationResult\": false, \"validationFailedReason\": {\"next\": \"question\", \"response\": \"Try again\"}}\n```";
        let parsed = extract_object(raw).unwrap();
        assert_eq!(
            JsonValue::Object(parsed),
            json!({
                "validationResult": false,
                "validationFailedReason": {"next": "question", "response": "Try again"}
            })
        );
    }

    fn json_object() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 {}\\[\\]:,\"]{0,16}".prop_map(JsonValue::String),
        ];
        let value = leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                    .prop_map(|m| JsonValue::Object(m.into_iter().collect())),
            ]
        });
        prop::collection::btree_map("[a-z]{1,8}", value, 0..5)
            .prop_map(|m| JsonValue::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn prop_fenced_object_survives_prose(
            object in json_object(),
            before in "[a-zA-Z .,!?\n]{0,40}",
            after in "[a-zA-Z .,!?\n]{0,40}",
        ) {
            let text = serde_json::to_string_pretty(&object).unwrap();
            let raw = format!("{before}```json\n{text}\n```{after}");

            let extracted = sanitize(&raw).unwrap();
            let reparsed: JsonValue = serde_json::from_str(extracted).unwrap();
            prop_assert_eq!(reparsed, object);
        }

        #[test]
        fn prop_unfenced_object_survives_brace_free_prose(
            object in json_object(),
            before in "[a-zA-Z .,!?\n]{0,40}",
            after in "[a-zA-Z .,!?\n]{0,40}",
        ) {
            let text = serde_json::to_string(&object).unwrap();
            let raw = format!("{before}{text}{after}");

            let parsed = extract_object(&raw).unwrap();
            prop_assert_eq!(JsonValue::Object(parsed), object);
        }
    }
}
