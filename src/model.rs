//! Record types exchanged with the store.
//!
//! Incoming attributes are kept as loose JSON values: the store binds
//! whatever the client supplied (numbers, strings, nulls) without range or
//! type checks, and SQLite's column affinity decides how it is kept. Rows
//! read back are likewise returned as JSON objects keyed by column name.

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Prediction label counted as a real image.
pub const REAL_LABEL: &str = "Gerçek";
/// Prediction label counted as a fake image.
pub const FAKE_LABEL: &str = "Sahte";

/// One stored analysis row, keyed by column name.
pub type AnalysisRow = Map<String, Value>;

/// Attributes of a detection outcome submitted for storage.
///
/// The owner is deliberately absent: in per-user mode it comes from the
/// authenticated identity, never from the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAnalysis {
    pub image_hash: Value,
    pub image_data: Value,
    pub prediction: Value,
    pub confidence: Value,
    pub analysis_mode: Value,
    pub processing_time: Value,
    pub model_used: Value,
    pub model_author: Value,
    pub probabilities: Value,
    pub raw_score: Value,
    pub timestamp: Value,
    pub device_info: Value,
    pub app_version: Value,
}

/// A user's judgment on an earlier analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewFeedback {
    pub analysis_id: Value,
    pub feedback: Value,
    pub timestamp: Value,
}

/// Aggregate counters over the visible analysis rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_analyses: i64,
    pub real_count: i64,
    pub fake_count: i64,
    pub average_confidence: f64,
}

/// Bind a client-supplied value as-is. Objects and arrays become their JSON
/// text.
pub(crate) fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Serialize a structured value to JSON text, whatever its shape. Absent
/// values stay NULL.
pub(crate) fn json_text(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        other => SqlValue::Text(other.to_string()),
    }
}

pub(crate) fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
