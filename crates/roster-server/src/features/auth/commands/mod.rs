//! Auth write operations

pub mod admins;
pub mod login;

pub use admins::{
    AdminError, ChangeAdminPasswordCommand, CreateAdminCommand, SetAdminStateCommand,
    UpdateAdminProfileCommand,
};
pub use login::{LoginChallengeResponse, LoginCommand, LoginSuccessResponse, VerifyOtpCommand};
