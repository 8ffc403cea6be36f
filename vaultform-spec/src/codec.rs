//! Pure per-field encode/decode helpers shared by the resource definitions.
//!
//! Every encoder has a matching tolerant decoder; validators run before any
//! network call and report errors keyed to the offending field.

use crate::error::{Error, Result};
use crate::value::Value;
use serde_json::{Map, Value as Json};

/// Sentinel the remote store understands as "use the server default" for
/// metadata collections.
pub const METADATA_DEFAULT: &str = "default";

/// Format a second count the way the remote store expects durations.
pub fn encode_duration_seconds(seconds: i64) -> String {
    format!("{seconds}s")
}

/// Parse a duration reported by the remote store back into seconds.
///
/// Listings report integers while write payloads carry `"Ns"` strings; both
/// forms are accepted.
pub fn decode_duration_seconds(field: &'static str, json: &Json) -> Result<i64> {
    if let Some(n) = json.as_i64() {
        return Ok(n);
    }
    if let Some(s) = json.as_str() {
        let digits = s.strip_suffix('s').unwrap_or(s);
        if let Ok(n) = digits.parse::<i64>() {
            return Ok(n);
        }
    }
    Err(Error::WrongKind {
        field,
        expected: "integer or duration",
    })
}

pub fn encode_str_set(items: &[String]) -> Json {
    Json::Array(items.iter().cloned().map(Json::String).collect())
}

pub fn decode_str_set(field: &'static str, json: &Json) -> Result<Vec<String>> {
    let array = json.as_array().ok_or(Error::WrongKind {
        field,
        expected: "array of strings",
    })?;
    array
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or(Error::WrongKind {
                field,
                expected: "array of strings",
            })
        })
        .collect()
}

/// Encode a metadata collection honoring the "use default" flag: when the
/// flag is set the literal sentinel is written instead of the collection,
/// regardless of what the collection holds.
pub fn encode_metadata(use_default: bool, items: &[String]) -> Json {
    if use_default {
        Json::String(METADATA_DEFAULT.to_string())
    } else {
        encode_str_set(items)
    }
}

/// Schema validator for credential blobs: the field must hold a JSON object.
///
/// Rejecting malformed input here keeps a bad credential from ever reaching
/// the remote store.
pub fn validate_credentials_json(field: &'static str, value: &Value) -> Result<()> {
    let raw = value.as_str().ok_or(Error::WrongKind {
        field,
        expected: "string",
    })?;
    match serde_json::from_str::<Map<String, Json>>(raw) {
        Ok(_) => Ok(()),
        Err(err) => Err(Error::validation(field, err.to_string())),
    }
}

/// Canonicalize a credential blob so that semantically equal documents
/// compare equal as strings.
///
/// serde_json object maps iterate in sorted key order, so re-serializing is
/// deterministic and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize_credentials_json(field: &'static str, raw: &str) -> Result<String> {
    let parsed: Map<String, Json> =
        serde_json::from_str(raw).map_err(|err| Error::validation(field, err.to_string()))?;
    serde_json::to_string(&parsed).map_err(|err| Error::validation(field, err.to_string()))
}
