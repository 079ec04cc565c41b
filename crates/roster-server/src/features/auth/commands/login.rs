//! Login commands: credential step and code step

use serde::{Deserialize, Serialize};

use crate::db::Record;
use crate::features::auth::otp::{is_otp_code, LoginError, LoginFlow};
use crate::features::shared::require_text;

pub const STATUS_2FA_REQUIRED: &str = "2FA_REQUIRED";
pub const STATUS_LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";

/// `POST /auth/login` body
#[derive(Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn validate(&self) -> Result<(), LoginError> {
        require_text("email", &self.email)?;
        require_text("password", &self.password)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginChallengeResponse {
    pub status: String,
    pub admin_id: i32,
    pub message: String,
}

/// `POST /auth/login/verify-otp` body
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpCommand {
    pub admin_id: i32,
    pub code: String,
}

impl VerifyOtpCommand {
    pub fn validate(&self) -> Result<(), LoginError> {
        if !is_otp_code(&self.code) {
            return Err(LoginError::MalformedCode);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginSuccessResponse {
    pub status: String,
    pub admin: Record,
}

#[tracing::instrument(skip(flow, command), fields(email = %command.email))]
pub async fn handle_login(
    flow: &LoginFlow,
    command: LoginCommand,
) -> Result<LoginChallengeResponse, LoginError> {
    command.validate()?;

    let challenge = flow.begin(command.email.trim(), &command.password).await?;

    Ok(LoginChallengeResponse {
        status: STATUS_2FA_REQUIRED.to_string(),
        admin_id: challenge.admin_id,
        message: "A verification code was sent to your email".to_string(),
    })
}

#[tracing::instrument(skip(flow, command), fields(admin_id = command.admin_id))]
pub async fn handle_verify(
    flow: &LoginFlow,
    command: VerifyOtpCommand,
) -> Result<LoginSuccessResponse, LoginError> {
    command.validate()?;

    let admin = flow.verify(command.admin_id, &command.code).await?;

    Ok(LoginSuccessResponse {
        status: STATUS_LOGIN_SUCCESS.to_string(),
        admin,
    })
}
