//! Instructor read operations

pub mod list;

pub use list::{InstructorDetail, InstructorListing, ListInstructorsQuery};
