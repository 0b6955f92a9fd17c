//! Snapshot encoding and save-payload normalization
//!
//! A snapshot is the whole todo list as a JSON array of strings. The API
//! accepts two request shapes and normalizes both to the bare array:
//!
//! ```text
//! ["Buy milk", "Call mom"]
//! { "todos": ["Buy milk", "Call mom"] }
//! ```

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

/// Fixed store key holding the snapshot
pub const SNAPSHOT_KEY: &str = "todos";

/// Encoding of the empty snapshot
pub const EMPTY_SNAPSHOT: &str = "[]";

/// A save request body that matches neither accepted shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Body is not JSON at all
    #[error("Request body is not valid JSON: {details}")]
    MalformedJson { raw: String, details: String },

    /// Body is JSON but neither an array of strings nor `{todos: [...]}`
    #[error("Expected an array of strings or an object with a `todos` array of strings")]
    UnsupportedShape { received: Value },
}

impl ValidationError {
    /// The payload as the client sent it, for echoing back
    pub fn received(&self) -> Value {
        match self {
            ValidationError::MalformedJson { raw, .. } => Value::String(raw.clone()),
            ValidationError::UnsupportedShape { received } => received.clone(),
        }
    }
}

/// Examples of the accepted save body shapes
pub fn accepted_formats() -> Value {
    json!([
        { "example": ["Buy milk", "Call mom"] },
        { "example": { "todos": ["Buy milk", "Call mom"] } }
    ])
}

/// Parse a raw save body and normalize it to the bare array
pub fn parse_payload(body: &[u8]) -> Result<Vec<String>, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ValidationError::MalformedJson {
        raw: String::from_utf8_lossy(body).into_owned(),
        details: e.to_string(),
    })?;
    normalize_payload(&value)
}

/// Normalize an already parsed save body to the bare array
///
/// Accepts an array of strings, or an object whose `todos` field is an array
/// of strings. Other fields next to `todos` are ignored.
pub fn normalize_payload(value: &Value) -> Result<Vec<String>, ValidationError> {
    let candidate = match value {
        Value::Array(_) => Some(value),
        Value::Object(map) => map.get("todos"),
        _ => None,
    };

    candidate
        .and_then(string_array)
        .ok_or_else(|| ValidationError::UnsupportedShape {
            received: value.clone(),
        })
}

/// Decode a stored snapshot
///
/// A missing value, or one that is not an array of strings, reads as empty.
pub fn decode_snapshot(stored: Option<&str>) -> Vec<String> {
    let Some(raw) = stored else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Stored snapshot is not an array of strings, reading as empty: {}", e);
            Vec::new()
        }
    }
}

/// Encode items as the stored snapshot value
pub fn encode_snapshot(items: &[String]) -> String {
    // Serializing a slice of strings cannot fail
    serde_json::to_string(items).unwrap_or_else(|_| EMPTY_SNAPSHOT.to_string())
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_accepted() {
        let items = parse_payload(br#"["a", "b"]"#).unwrap();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_wrapped_array_accepted() {
        let items = parse_payload(br#"{"todos": ["c"]}"#).unwrap();
        assert_eq!(items, vec!["c"]);
    }

    #[test]
    fn test_both_shapes_normalize_identically() {
        let bare = parse_payload(br#"["x", "y", "z"]"#).unwrap();
        let wrapped = parse_payload(br#"{"todos": ["x", "y", "z"], "extra": true}"#).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(encode_snapshot(&bare), encode_snapshot(&wrapped));
    }

    #[test]
    fn test_empty_array_accepted() {
        assert!(parse_payload(b"[]").unwrap().is_empty());
        assert!(parse_payload(br#"{"todos": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_shapes_rejected() {
        for body in [
            r#"{}"#,
            r#""text""#,
            "5",
            "null",
            "true",
            r#"{"bogus": 1}"#,
            r#"{"todos": "not a list"}"#,
            r#"[1, 2]"#,
            r#"["ok", null]"#,
            r#"{"todos": [["nested"]]}"#,
        ] {
            let err = parse_payload(body.as_bytes()).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedShape { .. }),
                "expected shape rejection for {}",
                body
            );
        }
    }

    #[test]
    fn test_received_echoes_payload() {
        let err = parse_payload(br#"{"bogus": 1}"#).unwrap_err();
        assert_eq!(err.received(), json!({"bogus": 1}));
    }

    #[test]
    fn test_malformed_json_keeps_raw_text() {
        let err = parse_payload(b"[\"a\",").unwrap_err();
        assert!(matches!(err, ValidationError::MalformedJson { .. }));
        assert_eq!(err.received(), Value::String("[\"a\",".to_string()));
    }

    #[test]
    fn test_decode_missing_is_empty() {
        assert!(decode_snapshot(None).is_empty());
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode_snapshot(Some("not json")).is_empty());
        assert!(decode_snapshot(Some(r#"{"todos": ["a"]}"#)).is_empty());
        assert!(decode_snapshot(Some("[1, 2]")).is_empty());
    }

    #[test]
    fn test_decode_preserves_order() {
        let items = decode_snapshot(Some(r#"["b", "a", "b"]"#));
        assert_eq!(items, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_accepted_formats_lists_both_shapes() {
        let formats = accepted_formats();
        let formats = formats.as_array().unwrap();
        assert_eq!(formats.len(), 2);
        assert!(formats[0]["example"].is_array());
        assert!(formats[1]["example"]["todos"].is_array());
    }
}
