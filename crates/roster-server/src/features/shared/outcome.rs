//! Reading procedure-reported outcomes
//!
//! Procedures report business-rule failures as a row with
//! `status = "ERROR"` and a `message` column instead of raising. The invoker
//! passes such rows through untouched; handlers use these helpers to turn
//! them into rejections.

use serde_json::Value;

use crate::db::{ProcedureResult, Record};

const DEFAULT_REJECTION: &str = "The operation was rejected";

/// `message` column of a record, if it is text
pub fn message_of(record: &Record) -> Option<&str> {
    record.get("message").and_then(Value::as_str)
}

/// The rejection message when the procedure answered `status = "ERROR"`
fn rejection(result: &ProcedureResult) -> Option<String> {
    if !result.is_rejection() {
        return None;
    }
    Some(
        result
            .first()
            .and_then(message_of)
            .unwrap_or(DEFAULT_REJECTION)
            .to_string(),
    )
}

/// First row of an accepted call; a rejection becomes `rejected(message)`
pub fn accept<E>(result: ProcedureResult, rejected: impl FnOnce(String) -> E) -> Result<Record, E> {
    if let Some(message) = rejection(&result) {
        return Err(rejected(message));
    }
    Ok(result.into_rows().into_iter().next().unwrap_or_default())
}

/// `total` column of a count procedure's first row; zero when absent
pub fn total_of(result: &ProcedureResult) -> i64 {
    if !result.produced_rows() {
        return 0;
    }
    result
        .first()
        .and_then(|record| record.get("total"))
        .and_then(|total| total.as_i64().or_else(|| total.as_str()?.parse().ok()))
        .unwrap_or(0)
}
