//! Row serialization
//!
//! Converts decoded column values into JSON-safe form:
//! - binary → `data:<mime>;base64,...` (see [`roster_common::data_uri`])
//! - date / time / timestamp → ISO-8601 text
//! - everything else unchanged
//!
//! The output record has exactly the input columns, in column order.

use chrono::SecondsFormat;
use roster_common::data_uri::to_data_uri;
use serde_json::{Map, Number, Value};

use super::SqlValue;

/// A serialized row: column name → JSON value, in column order
pub type Record = Map<String, Value>;

/// Serialize one value
pub fn serialize_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Bool(v) => v.map_or(Value::Null, Value::Bool),
        SqlValue::Int(v) => v.map_or(Value::Null, Value::from),
        SqlValue::BigInt(v) => v.map_or(Value::Null, Value::from),
        SqlValue::Float(v) => v
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        SqlValue::Numeric(v) => v.as_deref().map_or(Value::Null, numeric_to_json),
        SqlValue::Text(v) => v.clone().map_or(Value::Null, Value::String),
        SqlValue::Bytes(v) => v
            .as_deref()
            .map_or(Value::Null, |bytes| Value::String(to_data_uri(bytes))),
        SqlValue::Date(v) => v.map_or(Value::Null, |d| {
            Value::String(d.format("%Y-%m-%d").to_string())
        }),
        SqlValue::Time(v) => v.map_or(Value::Null, |t| {
            Value::String(t.format("%H:%M:%S%.f").to_string())
        }),
        SqlValue::Timestamp(v) => v.map_or(Value::Null, |ts| {
            Value::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }),
        SqlValue::TimestampTz(v) => v.map_or(Value::Null, |ts| {
            Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        }),
        SqlValue::Json(v) => v.clone().unwrap_or(Value::Null),
    }
}

/// Serialize one row against its column names
///
/// Columns and values are paired positionally; a short row leaves the
/// remaining columns out rather than inventing values.
pub fn serialize_row(columns: &[String], row: &[SqlValue]) -> Record {
    columns
        .iter()
        .zip(row)
        .map(|(column, value)| (column.clone(), serialize_value(value)))
        .collect()
}

fn numeric_to_json(text: &str) -> Value {
    text.parse::<i64>()
        .ok()
        .map(Value::from)
        .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number))
        .unwrap_or_else(|| Value::String(text.to_string()))
}
