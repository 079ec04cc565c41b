//! Request field validation
//!
//! These run before a procedure is called so malformed input never costs a
//! connection.

use thiserror::Error;

/// A request field that failed its check
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },
}

/// Non-blank text field
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Positive database identifier
pub fn require_id(field: &'static str, id: i32) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}

/// Minimal address shape check; the mail relay has the final word
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        },
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidEmail {
            value: email.to_string(),
        });
    }
    Ok(())
}
