//! Register and update instructors with named-parameter calls

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record, SqlValue};
use crate::features::instructors::InstructorError;
use crate::features::shared::{accept, require_id, require_text, validate_email};

pub const DEFAULT_INSTRUCTOR_STATE: &str = "Active";

fn default_state() -> String {
    DEFAULT_INSTRUCTOR_STATE.to_string()
}

/// `POST /instructors`
///
/// `photo` is base64 text, with or without a `data:` prefix, stored as sent.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInstructorCommand {
    pub full_name: String,
    pub specialty: String,
    pub rank: Option<String>,
    #[serde(default)]
    pub experience_years: i32,
    pub certifications: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    pub admin_id: i32,
}

impl RegisterInstructorCommand {
    fn validate(&self) -> Result<(), InstructorError> {
        validate_profile(
            &self.full_name,
            &self.specialty,
            self.experience_years,
            self.email.as_deref(),
        )?;
        require_id("admin_id", self.admin_id)?;
        Ok(())
    }

    fn into_params(self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("p_full_name", self.full_name.into()),
            ("p_specialty", self.specialty.into()),
            ("p_rank", self.rank.into()),
            ("p_experience_years", self.experience_years.into()),
            ("p_certifications", self.certifications.into()),
            ("p_email", self.email.into()),
            ("p_phone", self.phone.into()),
            ("p_photo", self.photo.into()),
            ("p_bio", self.bio.into()),
            ("p_admin_id", self.admin_id.into()),
        ]
    }
}

/// `PUT /instructors`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInstructorCommand {
    pub instructor_id: i32,
    pub full_name: String,
    pub specialty: String,
    pub rank: Option<String>,
    #[serde(default)]
    pub experience_years: i32,
    pub certifications: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub bio: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    pub admin_id: i32,
}

impl UpdateInstructorCommand {
    fn validate(&self) -> Result<(), InstructorError> {
        require_id("instructor_id", self.instructor_id)?;
        validate_profile(
            &self.full_name,
            &self.specialty,
            self.experience_years,
            self.email.as_deref(),
        )?;
        require_id("admin_id", self.admin_id)?;
        Ok(())
    }

    fn into_params(self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("p_instructor_id", self.instructor_id.into()),
            ("p_full_name", self.full_name.into()),
            ("p_specialty", self.specialty.into()),
            ("p_rank", self.rank.into()),
            ("p_experience_years", self.experience_years.into()),
            ("p_certifications", self.certifications.into()),
            ("p_email", self.email.into()),
            ("p_phone", self.phone.into()),
            ("p_photo", self.photo.into()),
            ("p_bio", self.bio.into()),
            ("p_state", self.state.into()),
            ("p_admin_id", self.admin_id.into()),
        ]
    }
}

fn validate_profile(
    full_name: &str,
    specialty: &str,
    experience_years: i32,
    email: Option<&str>,
) -> Result<(), InstructorError> {
    require_text("full_name", full_name)?;
    require_text("specialty", specialty)?;
    if experience_years < 0 {
        return Err(InstructorError::Validation(
            "experience_years cannot be negative".to_string(),
        ));
    }
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }
    Ok(())
}

#[tracing::instrument(skip(invoker, command), fields(admin_id = command.admin_id))]
pub async fn register(
    invoker: &ProcedureInvoker,
    command: RegisterInstructorCommand,
) -> Result<Record, InstructorError> {
    command.validate()?;
    let call = ProcedureCall::named("sp_register_instructor", command.into_params());
    let record = accept(invoker.invoke(&call).await?, InstructorError::Rejected)?;
    tracing::info!("Instructor registered");
    Ok(record)
}

#[tracing::instrument(
    skip(invoker, command),
    fields(instructor_id = command.instructor_id, admin_id = command.admin_id)
)]
pub async fn update(
    invoker: &ProcedureInvoker,
    command: UpdateInstructorCommand,
) -> Result<Record, InstructorError> {
    command.validate()?;
    let call = ProcedureCall::named("sp_update_instructor", command.into_params());
    accept(invoker.invoke(&call).await?, InstructorError::Rejected)
}
