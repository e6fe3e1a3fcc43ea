//! Canonical JSON encoder for event-body hashing.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanonJsonError {
    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a value to canonical JSON bytes.
///
/// Canonical rules:
/// - object keys sorted by UTF-8 byte order, recursively
/// - no insignificant whitespace
///
/// Event bodies carry only strings, booleans, and integers, so float
/// canonicalization is out of scope here.
pub fn to_canon_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonJsonError> {
    let value = serde_json::to_value(value)?;
    let canon = canon_value(value);
    Ok(serde_json::to_vec(&canon)?)
}

fn canon_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            let mut sorted = Map::new();
            for (key, val) in entries {
                sorted.insert(key, canon_value(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canon_value).collect()),
        other => other,
    }
}
