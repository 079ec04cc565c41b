//! API layer shared by every feature slice

pub mod response;

pub use response::{ApiResponse, ErrorResponse, PaginationMeta};
