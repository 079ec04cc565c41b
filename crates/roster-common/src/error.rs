//! Error types shared across Roster crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, RosterError>;

/// Main error type for shared Roster code
#[derive(Error, Debug)]
pub enum RosterError {
    /// Not 32 lowercase hexadecimal characters
    #[error("Invalid identifier hash: '{0}' must be 32 lowercase hex characters")]
    InvalidHash(String),
}
