//! Shared utilities for feature modules
//!
//! - **pagination**: page/per-page parameters and their validation
//! - **validation**: request field checks run before any procedure call
//! - **outcome**: reading `status`/`message`/`total` out of procedure rows

pub mod outcome;
pub mod pagination;
pub mod validation;

pub use outcome::{accept, message_of, total_of};
pub use pagination::PaginationParams;
pub use validation::{require_id, require_text, validate_email, ValidationError};
