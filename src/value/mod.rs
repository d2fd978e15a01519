//! Tagged values carried by the telemetry bus.
//!
//! The bridge sends `value` as plain JSON next to a `valueType` string. The
//! type string drives decoding into [`NtValue`]; payloads that do not fit
//! their declared kind are kept verbatim as [`NtValue::Json`] so nothing the
//! robot publishes is lost.


use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::constants::UNKNOWN_VALUE_TYPE;

/// Kind of a value as announced by the `valueType` wire field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Double,
    Float,
    Integer,
    String,
    Raw,
    Json,
    BooleanArray,
    DoubleArray,
    FloatArray,
    IntegerArray,
    StringArray,
    /// Written before any value was observed for the key
    Unknown,
    Other(String),
}

impl ValueKind {
    pub fn parse(value_type: &str) -> Self {
        match value_type {
            "boolean" => ValueKind::Boolean,
            "double" => ValueKind::Double,
            "float" => ValueKind::Float,
            "int" | "integer" => ValueKind::Integer,
            "string" => ValueKind::String,
            "raw" => ValueKind::Raw,
            "json" => ValueKind::Json,
            "boolean[]" => ValueKind::BooleanArray,
            "double[]" => ValueKind::DoubleArray,
            "float[]" => ValueKind::FloatArray,
            "int[]" | "integer[]" => ValueKind::IntegerArray,
            "string[]" => ValueKind::StringArray,
            UNKNOWN_VALUE_TYPE => ValueKind::Unknown,
            other => ValueKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Double => "double",
            ValueKind::Float => "float",
            ValueKind::Integer => "integer",
            ValueKind::String => "string",
            ValueKind::Raw => "raw",
            ValueKind::Json => "json",
            ValueKind::BooleanArray => "boolean[]",
            ValueKind::DoubleArray => "double[]",
            ValueKind::FloatArray => "float[]",
            ValueKind::IntegerArray => "integer[]",
            ValueKind::StringArray => "string[]",
            ValueKind::Unknown => UNKNOWN_VALUE_TYPE,
            ValueKind::Other(other) => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            ValueKind::BooleanArray
                | ValueKind::DoubleArray
                | ValueKind::FloatArray
                | ValueKind::IntegerArray
                | ValueKind::StringArray
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value published on the bus
///
/// Serializes untagged, i.e. exactly as the JSON the bridge expects in the
/// `value` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NtValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    BooleanArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    /// Anything that does not fit its declared kind
    Json(Value),
}

impl NtValue {
    /// Decodes a wire payload according to its declared kind.
    pub fn from_wire(
        kind: &ValueKind,
        raw: Value,
    ) -> Self {
        let decoded = match kind {
            ValueKind::Boolean => raw.as_bool().map(NtValue::Boolean),
            ValueKind::Double | ValueKind::Float => raw.as_f64().map(NtValue::Double),
            ValueKind::Integer => json_to_i64(&raw).map(NtValue::Integer),
            ValueKind::String => raw.as_str().map(|s| NtValue::String(s.to_string())),
            ValueKind::BooleanArray => collect_array(&raw, Value::as_bool).map(NtValue::BooleanArray),
            ValueKind::DoubleArray | ValueKind::FloatArray => collect_array(&raw, Value::as_f64).map(NtValue::DoubleArray),
            ValueKind::IntegerArray => collect_array(&raw, json_to_i64).map(NtValue::IntegerArray),
            ValueKind::StringArray => {
                collect_array(&raw, |v| v.as_str().map(str::to_string)).map(NtValue::StringArray)
            }
            ValueKind::Raw | ValueKind::Json | ValueKind::Unknown | ValueKind::Other(_) => None,
        };
        decoded.unwrap_or(NtValue::Json(raw))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NtValue::Boolean(b) => Some(*b),
            NtValue::Json(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NtValue::Integer(i) => Some(*i as f64),
            NtValue::Double(d) => Some(*d),
            NtValue::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NtValue::String(s) => Some(s),
            NtValue::Json(v) => v.as_str(),
            _ => None,
        }
    }

    /// Reads the value as a positive whole number, accepting numeric strings
    /// the way a loosely typed dashboard would.
    pub fn as_positive_integer(&self) -> Option<i64> {
        let n = match self {
            NtValue::Integer(i) => Some(*i),
            NtValue::Double(d) => f64_to_i64(*d),
            NtValue::String(s) => s.trim().parse::<f64>().ok().and_then(f64_to_i64),
            NtValue::Json(v) => json_to_i64(v),
            _ => None,
        }?;
        (n > 0).then_some(n)
    }

    pub fn is_array(&self) -> bool {
        match self {
            NtValue::BooleanArray(_) | NtValue::IntegerArray(_) | NtValue::DoubleArray(_) | NtValue::StringArray(_) => {
                true
            }
            NtValue::Json(v) => v.is_array(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn f64_to_i64(d: f64) -> Option<i64> {
    (d.is_finite() && d.fract() == 0.0 && d.abs() <= i64::MAX as f64).then_some(d as i64)
}

fn json_to_i64(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_f64().and_then(f64_to_i64))
}

fn collect_array<T>(
    raw: &Value,
    item: impl Fn(&Value) -> Option<T>,
) -> Option<Vec<T>> {
    raw.as_array()?.iter().map(item).collect()
}

fn join<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for NtValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            NtValue::Boolean(b) => write!(f, "{b}"),
            NtValue::Integer(i) => write!(f, "{i}"),
            NtValue::Double(d) => write!(f, "{d}"),
            NtValue::String(s) => f.write_str(s),
            NtValue::BooleanArray(items) => join(f, items),
            NtValue::IntegerArray(items) => join(f, items),
            NtValue::DoubleArray(items) => join(f, items),
            NtValue::StringArray(items) => join(f, items),
            NtValue::Json(Value::String(s)) => f.write_str(s),
            NtValue::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for NtValue {
    fn from(v: bool) -> Self {
        NtValue::Boolean(v)
    }
}

impl From<i64> for NtValue {
    fn from(v: i64) -> Self {
        NtValue::Integer(v)
    }
}

impl From<i32> for NtValue {
    fn from(v: i32) -> Self {
        NtValue::Integer(v.into())
    }
}

impl From<f64> for NtValue {
    fn from(v: f64) -> Self {
        NtValue::Double(v)
    }
}

impl From<&str> for NtValue {
    fn from(v: &str) -> Self {
        NtValue::String(v.to_string())
    }
}

impl From<String> for NtValue {
    fn from(v: String) -> Self {
        NtValue::String(v)
    }
}

impl From<Vec<bool>> for NtValue {
    fn from(v: Vec<bool>) -> Self {
        NtValue::BooleanArray(v)
    }
}

impl From<Vec<i64>> for NtValue {
    fn from(v: Vec<i64>) -> Self {
        NtValue::IntegerArray(v)
    }
}

impl From<Vec<f64>> for NtValue {
    fn from(v: Vec<f64>) -> Self {
        NtValue::DoubleArray(v)
    }
}

impl From<Vec<String>> for NtValue {
    fn from(v: Vec<String>) -> Self {
        NtValue::StringArray(v)
    }
}

impl From<Value> for NtValue {
    fn from(v: Value) -> Self {
        NtValue::Json(v)
    }
}

/// Latest value of an entry together with the `valueType` it arrived with
///
/// The raw type string is kept so writes echo exactly what the bridge sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedValue {
    pub value: NtValue,
    pub value_type: String,
}

impl TaggedValue {
    pub fn new(
        value_type: impl Into<String>,
        value: impl Into<NtValue>,
    ) -> Self {
        Self {
            value: value.into(),
            value_type: value_type.into(),
        }
    }

    pub fn from_wire(
        value_type: &str,
        raw: Value,
    ) -> Self {
        let kind = ValueKind::parse(value_type);
        Self {
            value: NtValue::from_wire(&kind, raw),
            value_type: value_type.to_string(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::parse(&self.value_type)
    }
}
