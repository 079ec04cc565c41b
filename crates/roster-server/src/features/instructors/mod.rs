//! Instructor records and their course/event assignments
//!
//! Register and update go through named-parameter calls; everything else is
//! positional.

pub mod commands;
pub mod queries;
pub mod routes;

use thiserror::Error;

use crate::db::ProcedureError;
use crate::error::AppError;
use crate::features::shared::ValidationError;

pub use routes::instructors_routes;

#[derive(Error, Debug)]
pub enum InstructorError {
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

impl From<InstructorError> for AppError {
    fn from(err: InstructorError) -> Self {
        match err {
            InstructorError::Validation(message) => AppError::Validation(message),
            InstructorError::Invalid(e) => AppError::Validation(e.to_string()),
            InstructorError::Rejected(message) => AppError::Rejected(message),
            InstructorError::NotFound(message) => AppError::NotFound(message),
            InstructorError::Procedure(e) => e.into(),
        }
    }
}
