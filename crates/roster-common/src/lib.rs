//! Roster Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the Roster back office.
//!
//! # Overview
//!
//! - **Identifier hashing**: public, non-enumerable tokens for integer row ids
//! - **Data URIs**: binary column values rendered as inline `data:` strings
//! - **Logging**: tracing subscriber bootstrap shared by every binary
//! - **Error Handling**: common error and result types
//!
//! # Example
//!
//! ```
//! use roster_common::hash_id::hash_id;
//!
//! let token = hash_id(1);
//! assert_eq!(token.len(), 32);
//! ```

pub mod data_uri;
pub mod error;
pub mod hash_id;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, RosterError};
