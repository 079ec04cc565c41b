//! Administrator account management
//!
//! Each command is one procedure call. The procedures answer with a status
//! row; `status = "ERROR"` becomes [`AdminError::Rejected`].

use serde::Deserialize;
use thiserror::Error;

use crate::db::{ProcedureCall, ProcedureError, ProcedureInvoker, Record, SqlValue};
use crate::error::AppError;
use crate::features::shared::{accept, require_id, require_text, validate_email, ValidationError};

pub const DEFAULT_ADMIN_ROLE: &str = "Editor";

#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Invalid(e) => AppError::Validation(e.to_string()),
            AdminError::Rejected(message) => AppError::Rejected(message),
            AdminError::Procedure(e) => e.into(),
        }
    }
}

fn default_role() -> String {
    DEFAULT_ADMIN_ROLE.to_string()
}

/// `POST /auth/admins`
#[derive(Clone, Deserialize)]
pub struct CreateAdminCommand {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub photo: Option<String>,
    pub created_by: Option<i32>,
}

impl CreateAdminCommand {
    pub fn validate(&self) -> Result<(), AdminError> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)?;
        require_text("full_name", &self.full_name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

#[tracing::instrument(skip(invoker, command), fields(username = %command.username))]
pub async fn create(invoker: &ProcedureInvoker, command: CreateAdminCommand) -> Result<Record, AdminError> {
    command.validate()?;

    let call = ProcedureCall::positional(
        "sp_create_admin",
        vec![
            command.username.trim().into(),
            command.password.into(),
            command.full_name.trim().into(),
            command.email.trim().into(),
            command.role.into(),
            command.photo.into(),
            command.created_by.into(),
        ],
    );
    let record = accept(invoker.invoke(&call).await?, AdminError::Rejected)?;

    tracing::info!("Administrator created");
    Ok(record)
}

/// `PUT /auth/admins/profile`; absent fields are left unchanged
#[derive(Clone, Deserialize)]
pub struct UpdateAdminProfileCommand {
    pub admin_id: i32,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl UpdateAdminProfileCommand {
    pub fn validate(&self) -> Result<(), AdminError> {
        require_id("admin_id", self.admin_id)?;
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(invoker, command), fields(admin_id = command.admin_id))]
pub async fn update_profile(
    invoker: &ProcedureInvoker,
    command: UpdateAdminProfileCommand,
) -> Result<Record, AdminError> {
    command.validate()?;

    let call = ProcedureCall::positional(
        "sp_update_admin_profile",
        vec![
            command.admin_id.into(),
            SqlValue::non_blank(command.full_name.as_deref()),
            SqlValue::non_blank(command.email.as_deref()),
            command.photo.into(),
            command.current_password.into(),
            command.new_password.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, AdminError::Rejected)
}

/// `PUT /auth/admins/password`: reset by another administrator
#[derive(Clone, Deserialize)]
pub struct ChangeAdminPasswordCommand {
    pub admin_id: i32,
    pub new_password: String,
    pub modified_by: i32,
}

#[tracing::instrument(skip(invoker, command), fields(admin_id = command.admin_id, modified_by = command.modified_by))]
pub async fn change_password(
    invoker: &ProcedureInvoker,
    command: ChangeAdminPasswordCommand,
) -> Result<Record, AdminError> {
    require_id("admin_id", command.admin_id)?;
    require_id("modified_by", command.modified_by)?;
    require_text("new_password", &command.new_password)?;

    let call = ProcedureCall::positional(
        "sp_change_admin_password",
        vec![
            command.admin_id.into(),
            command.new_password.into(),
            command.modified_by.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, AdminError::Rejected)
}

/// `PUT /auth/admins/state`
#[derive(Debug, Clone, Deserialize)]
pub struct SetAdminStateCommand {
    pub admin_id: i32,
    pub activate: bool,
    pub modified_by: i32,
}

#[tracing::instrument(skip(invoker), fields(admin_id = command.admin_id))]
pub async fn set_state(
    invoker: &ProcedureInvoker,
    command: SetAdminStateCommand,
) -> Result<Record, AdminError> {
    require_id("admin_id", command.admin_id)?;
    require_id("modified_by", command.modified_by)?;

    let call = ProcedureCall::positional(
        "sp_set_admin_state",
        vec![
            command.admin_id.into(),
            command.activate.into(),
            command.modified_by.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, AdminError::Rejected)
}
