//! Shallow JSON merge of stored values.

use serde_json::{Map, Value};

/// Combine an existing plaintext with an incoming one.
///
/// When both parse as JSON objects the result is their shallow union, with
/// incoming fields overriding existing ones and existing field order kept.
/// In every other case the incoming value replaces the existing one verbatim.
pub fn merge_values(existing: Option<&str>, incoming: &str) -> String {
    let Some(existing) = existing else {
        return incoming.to_string();
    };

    match (parse_object(existing), parse_object(incoming)) {
        (Some(mut base), Some(overlay)) => {
            for (field, value) in overlay {
                base.insert(field, value);
            }
            Value::Object(base).to_string()
        }
        _ => incoming.to_string(),
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
