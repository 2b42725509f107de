//! Runtime values of the expression language.

use std::collections::BTreeMap;
use std::fmt;

/// The closed set of values an expression can produce.
///
/// Records keep their fields ordered so two renders of the same data always
/// serialize identically.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness of the original host language: null, `false`, zero, NaN
    /// and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Number(value) => *value != 0.0 && !value.is_nan(),
            Value::String(value) => !value.is_empty(),
            Value::Record(_) => true,
        }
    }

    /// Builds a value from parsed JSON. Arrays have no counterpart in the
    /// expression language and collapse to their JSON serialization.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(*value),
            serde_json::Value::Number(value) => Value::Number(value.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(value) => Value::String(value.clone()),
            serde_json::Value::Object(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from_json(value)))
                    .collect(),
            ),
            other @ serde_json::Value::Array(_) => Value::String(other.to_string()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::Number(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(value) => serde_json::Value::String(value.clone()),
            Value::Record(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => {
                // the integer formatting only holds inside i64 range; the
                // cast would saturate beyond it
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            Value::String(value) => f.write_str(value),
            Value::Record(_) => f.write_str(&self.to_json().to_string()),
        }
    }
}
