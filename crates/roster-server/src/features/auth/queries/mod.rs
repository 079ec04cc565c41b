//! Auth read operations

pub mod admins;

pub use admins::{CheckSessionQuery, ListAdminsQuery};
