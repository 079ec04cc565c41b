//! Administrator authentication and account management

pub mod commands;
pub mod otp;
pub mod queries;
pub mod routes;

pub use otp::{LoginError, LoginFlow, OtpChallenge};
pub use routes::auth_routes;
