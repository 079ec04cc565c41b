//! Member read operations

pub mod detail;
pub mod list;
pub mod search;

pub use detail::MemberDetail;
pub use list::{ExportMembersQuery, ListApplicantsQuery, ListMembersQuery, Listing};
pub use search::{SearchByHashQuery, SearchMembersQuery, SearchResponse};
