//! Member records: search, listings, detail, edits, photo and courses
//!
//! Public lookups never expose the integer id alone: every searched member
//! carries a `hash` ([`roster_common::hash_id`]) that the database can match
//! with its own MD5 formula.

pub mod commands;
pub mod queries;
pub mod routes;

use roster_common::hash_id::hash_id;
use serde_json::Value;
use thiserror::Error;

use crate::db::{ProcedureError, ProcedureResult, Record};
use crate::error::AppError;
use crate::features::shared::ValidationError;

pub use routes::members_routes;

#[derive(Error, Debug)]
pub enum MemberError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl From<MemberError> for AppError {
    fn from(err: MemberError) -> Self {
        match err {
            MemberError::Validation(message) => AppError::Validation(message),
            MemberError::Invalid(e) => AppError::Validation(e.to_string()),
            MemberError::Rejected(message) => AppError::Rejected(message),
            MemberError::NotFound(message) => AppError::NotFound(message),
            MemberError::Procedure(e) => e.into(),
        }
    }
}

/// Exactly one real row, else [`MemberError::NotFound`]
pub(crate) fn single(result: ProcedureResult, what: &str) -> Result<Record, MemberError> {
    result.single(what).map_err(|e| match e {
        ProcedureError::NotFound(message) => MemberError::NotFound(message),
        other => MemberError::Procedure(other),
    })
}

/// Add `hash` next to a numeric `id`
pub(crate) fn with_hash(mut record: Record) -> Record {
    if let Some(id) = record.get("id").and_then(Value::as_i64) {
        record.insert("hash".to_string(), Value::String(hash_id(id)));
    }
    record
}
