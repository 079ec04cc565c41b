//! Instructor write operations

pub mod assign;
pub mod save;

pub use assign::{AssignCourseCommand, AssignEventCommand, DeleteInstructorCommand};
pub use save::{RegisterInstructorCommand, UpdateInstructorCommand};
