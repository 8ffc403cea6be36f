use crate::codec;
use crate::error::{Error, Result};
use crate::schema::FieldKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A typed attribute value held in local resource state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    StrSet(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Str(_) => FieldKind::Str,
            Value::Int(_) => FieldKind::Int,
            Value::Bool(_) => FieldKind::Bool,
            Value::StrSet(_) => FieldKind::StrSet,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&[String]> {
        match self {
            Value::StrSet(v) => Some(v),
            _ => None,
        }
    }

    /// Convert a remote JSON value into a local value for a declared kind.
    ///
    /// Decoding is tolerant: integer fields accept either a JSON number or a
    /// duration string such as `"3600s"`, and sets accept any JSON array of
    /// strings. Remote stores are free to report either form.
    pub fn from_json(field: &'static str, kind: FieldKind, json: &Json) -> Result<Value> {
        match kind {
            FieldKind::Str => json
                .as_str()
                .map(|v| Value::Str(v.to_string()))
                .ok_or(Error::WrongKind {
                    field,
                    expected: "string",
                }),
            FieldKind::Int => codec::decode_duration_seconds(field, json).map(Value::Int),
            FieldKind::Bool => json.as_bool().map(Value::Bool).ok_or(Error::WrongKind {
                field,
                expected: "boolean",
            }),
            FieldKind::StrSet => codec::decode_str_set(field, json).map(Value::StrSet),
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Value::Str(v) => Json::String(v.clone()),
            Value::Int(v) => Json::from(*v),
            Value::Bool(v) => Json::Bool(*v),
            Value::StrSet(v) => codec::encode_str_set(v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StrSet(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::StrSet(v.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn int_accepts_number_and_duration_string() {
        let n = Value::from_json("ttl", FieldKind::Int, &json!(3600)).unwrap();
        assert_eq!(n, Value::Int(3600));

        let s = Value::from_json("ttl", FieldKind::Int, &json!("3600s")).unwrap();
        assert_eq!(s, Value::Int(3600));
    }

    #[test]
    fn str_set_round_trips_through_json_array() {
        let set = Value::from(vec!["a", "b"]);
        assert_eq!(set.to_json(), json!(["a", "b"]));
        let back = Value::from_json("keys", FieldKind::StrSet, &set.to_json()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn kind_mismatch_is_reported_per_field() {
        let err = Value::from_json("local", FieldKind::Bool, &json!("yes")).unwrap_err();
        assert_eq!(
            err,
            Error::WrongKind {
                field: "local",
                expected: "boolean"
            }
        );
    }
}
