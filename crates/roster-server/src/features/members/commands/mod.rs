//! Member write operations

pub mod courses;
pub mod delete;
pub mod photo;
pub mod save;
pub mod status;

pub use courses::UpdateCoursesCommand;
pub use delete::DeleteMemberCommand;
pub use photo::{PhotoUpload, MAX_PHOTO_BYTES};
pub use save::{EditMemberFields, MemberFields, MemberSaved};
pub use status::{ChangeRankCommand, ChangeStateCommand};
