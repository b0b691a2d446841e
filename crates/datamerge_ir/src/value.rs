//! Dynamic cell values
//!
//! Spreadsheet cells arrive untyped. A [`Value`] carries whatever the record
//! source produced until an updater checks it against the shape it expects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest float that still holds every integer below it exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A dynamic value read from one record cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or null cell
    #[default]
    Null,
    /// Boolean cell
    Bool(bool),
    /// Integer cell
    Int(i64),
    /// Floating point cell
    Float(f64),
    /// Text cell
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object of values
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as object
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Text for assigning to a text node
    ///
    /// Strings are used as-is; everything else is JSON-encoded, with whole
    /// floats written without a fraction (`3.0` becomes `3`).
    pub fn to_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }

    /// Convert to a JSON value, collapsing whole floats to integers
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(i) => Json::from(*i),
            Self::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Json::from(*f as i64),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(map) => Json::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }

    /// Short name of the value's type, for log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json() {
        let v: Value = serde_json::from_str(r#"[1, 2.5, "a", true, null, {"k": 1}]"#).unwrap();
        let items = match v {
            Value::Array(items) => items,
            other => panic!("expected array, got {:?}", other),
        };
        assert_eq!(items[0], Value::Int(1));
        assert_eq!(items[1], Value::Float(2.5));
        assert_eq!(items[2], Value::from("a"));
        assert_eq!(items[3], Value::Bool(true));
        assert!(items[4].is_null());
        assert_eq!(items[5].as_object().unwrap().get("k"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_to_text_json_encodes_non_strings() {
        assert_eq!(Value::from("Hi").to_text(), "Hi");
        assert_eq!(Value::Int(42).to_text(), "42");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Null.to_text(), "null");
        let obj: Value = [("a", 1)].into_iter().collect();
        assert_eq!(obj.to_text(), r#"{"a":1}"#);
    }

    #[test]
    fn test_to_text_drops_fraction_of_whole_floats() {
        assert_eq!(Value::Float(3.0).to_text(), "3");
        assert_eq!(Value::Float(-0.0).to_text(), "0");
        assert_eq!(Value::Float(2.5).to_text(), "2.5");
        assert_eq!(Value::Float(f64::NAN).to_text(), "null");
        let nested = Value::Array(vec![Value::Float(10.0), Value::Float(0.25)]);
        assert_eq!(nested.to_text(), "[10,0.25]");
        let obj: Value = [("z", Value::Float(1.0)), ("a", Value::Int(2))].into_iter().collect();
        assert_eq!(obj.to_text(), r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_from_json_value() {
        let json = serde_json::json!({"n": 3, "f": 0.5, "s": "x"});
        let v = Value::from(json);
        let obj = v.as_object().unwrap();
        assert_eq!(obj["n"], Value::Int(3));
        assert_eq!(obj["f"], Value::Float(0.5));
        assert_eq!(obj["s"].as_str(), Some("x"));
    }
}
