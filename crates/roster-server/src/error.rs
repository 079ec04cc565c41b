//! Server error type and its HTTP mapping
//!
//! | variant        | status | code               |
//! |----------------|--------|--------------------|
//! | `Validation`   | 400    | `VALIDATION_ERROR` |
//! | `Rejected`     | 400    | `REJECTED`         |
//! | `Unauthorized` | 401    | `UNAUTHORIZED`     |
//! | `NotFound`     | 404    | `NOT_FOUND`        |
//! | `Delivery`     | 502    | `DELIVERY_FAILED`  |
//! | `Internal`     | 500    | `INTERNAL_ERROR`   |
//!
//! Internal messages are logged and replaced with a generic one in the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::ProcedureError;

pub type ApiResult<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// A procedure answered with `status = "ERROR"`
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Delivery(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Rejected(_) => (StatusCode::BAD_REQUEST, "REJECTED"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Delivery(_) => (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<ProcedureError> for AppError {
    fn from(err: ProcedureError) -> Self {
        match err {
            ProcedureError::NotFound(message) => AppError::NotFound(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                "An internal error occurred".to_string()
            },
            AppError::Delivery(message) => {
                tracing::warn!("Mail delivery failed: {}", message);
                "The verification code could not be delivered".to_string()
            },
            AppError::Validation(message)
            | AppError::Rejected(message)
            | AppError::Unauthorized(message)
            | AppError::NotFound(message) => message,
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
