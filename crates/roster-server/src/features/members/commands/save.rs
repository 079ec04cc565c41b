//! Create and edit members
//!
//! Both procedures take the same fifteen fields in the same order; edit
//! prepends the member id. Only create fills in rank, unit and state when the
//! body leaves them out; an edit must name them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{ProcedureCall, ProcedureInvoker, SqlValue};
use crate::features::members::MemberError;
use crate::features::shared::{accept, message_of, require_id, require_text, validate_email};

pub const DEFAULT_RANK: &str = "Aspirant";
pub const DEFAULT_STATE: &str = "Active";

fn default_rank() -> Option<String> {
    Some(DEFAULT_RANK.to_string())
}

fn default_state() -> Option<String> {
    Some(DEFAULT_STATE.to_string())
}

fn default_command_unit() -> Option<String> {
    Some(String::new())
}

/// Member body for `POST /members`
#[derive(Debug, Clone, Deserialize)]
pub struct MemberFields {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub profession: Option<String>,
    #[serde(default = "default_rank")]
    pub rank: Option<String>,
    #[serde(default = "default_command_unit")]
    pub command_unit: Option<String>,
    #[serde(default = "default_state")]
    pub state: Option<String>,
    pub admin_id: i32,
}

impl MemberFields {
    pub fn validate(&self) -> Result<(), MemberError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("national_id", &self.national_id)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email(email)?;
        }
        require_id("admin_id", self.admin_id)?;
        Ok(())
    }

    fn into_params(self) -> Vec<SqlValue> {
        vec![
            self.first_name.trim().into(),
            self.last_name.trim().into(),
            self.national_id.trim().into(),
            self.email.into(),
            self.phone.into(),
            self.birth_date.into(),
            self.gender.into(),
            self.department.into(),
            self.district.into(),
            self.address.into(),
            self.profession.into(),
            self.rank.into(),
            self.command_unit.into(),
            self.state.into(),
            self.admin_id.into(),
        ]
    }
}

/// Member body for `PUT /members/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct EditMemberFields {
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub department: Option<String>,
    pub district: Option<String>,
    pub address: Option<String>,
    pub profession: Option<String>,
    pub rank: String,
    pub command_unit: String,
    pub state: String,
    pub admin_id: i32,
}

impl EditMemberFields {
    fn checked(self) -> Result<MemberFields, MemberError> {
        require_text("gender", &self.gender)?;
        require_text("rank", &self.rank)?;
        require_text("state", &self.state)?;

        let member = MemberFields {
            first_name: self.first_name,
            last_name: self.last_name,
            national_id: self.national_id,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            gender: Some(self.gender),
            department: self.department,
            district: self.district,
            address: self.address,
            profession: self.profession,
            rank: Some(self.rank),
            command_unit: Some(self.command_unit),
            state: Some(self.state),
            admin_id: self.admin_id,
        };
        member.validate()?;
        Ok(member)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberSaved {
    pub message: Option<String>,
    pub member_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_number: Option<Value>,
}

#[tracing::instrument(skip(invoker, member), fields(admin_id = member.admin_id))]
pub async fn create(invoker: &ProcedureInvoker, member: MemberFields) -> Result<MemberSaved, MemberError> {
    member.validate()?;

    let record = accept(
        invoker
            .invoke(&ProcedureCall::positional("sp_create_member", member.into_params()))
            .await?,
        MemberError::Rejected,
    )?;

    let saved = MemberSaved {
        message: message_of(&record).map(str::to_string),
        member_id: record.get("member_id").cloned().unwrap_or(Value::Null),
        file_number: record.get("file_number").cloned(),
    };
    tracing::info!(member_id = %saved.member_id, "Member created");
    Ok(saved)
}

#[tracing::instrument(skip(invoker, member), fields(admin_id = member.admin_id))]
pub async fn edit(
    invoker: &ProcedureInvoker,
    member_id: i32,
    member: EditMemberFields,
) -> Result<MemberSaved, MemberError> {
    let member = member.checked()?;

    let mut params = vec![SqlValue::from(member_id)];
    params.extend(member.into_params());
    let record = accept(
        invoker
            .invoke(&ProcedureCall::positional("sp_edit_member", params))
            .await?,
        MemberError::Rejected,
    )?;

    Ok(MemberSaved {
        message: message_of(&record).map(str::to_string),
        member_id: record
            .get("member_id")
            .cloned()
            .unwrap_or_else(|| Value::from(member_id)),
        file_number: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> MemberFields {
        serde_json::from_value(json!({
            "first_name": "Rosa",
            "last_name": "Diaz",
            "national_id": "40112233",
            "birth_date": "1990-05-17",
            "admin_id": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let fields = fields();
        assert_eq!(fields.rank.as_deref(), Some("Aspirant"));
        assert_eq!(fields.state.as_deref(), Some("Active"));
        assert_eq!(fields.command_unit.as_deref(), Some(""));
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn test_params_order_and_types() {
        let params = fields().into_params();
        assert_eq!(params.len(), 15);
        assert_eq!(params[0], SqlValue::from("Rosa"));
        assert_eq!(params[3], SqlValue::Text(None));
        assert_eq!(
            params[5],
            SqlValue::from(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap())
        );
        assert_eq!(params[14], SqlValue::Int(Some(1)));
    }

    fn edit_fields() -> serde_json::Value {
        json!({
            "first_name": "Rosa",
            "last_name": "Diaz",
            "national_id": "40112233",
            "gender": "F",
            "rank": "Sergeant",
            "command_unit": "North",
            "state": "Suspended",
            "admin_id": 1
        })
    }

    #[test]
    fn test_edit_keeps_placement_fields() {
        let edit: EditMemberFields = serde_json::from_value(edit_fields()).unwrap();
        let params = edit.checked().unwrap().into_params();
        assert_eq!(params[6], SqlValue::from("F"));
        assert_eq!(params[11], SqlValue::from("Sergeant"));
        assert_eq!(params[12], SqlValue::from("North"));
        assert_eq!(params[13], SqlValue::from("Suspended"));
    }

    #[test]
    fn test_edit_requires_placement_fields() {
        for field in ["gender", "rank", "command_unit", "state"] {
            let mut body = edit_fields();
            body.as_object_mut().unwrap().remove(field);
            assert!(
                serde_json::from_value::<EditMemberFields>(body).is_err(),
                "{} should be required",
                field
            );
        }

        let mut body = edit_fields();
        body["rank"] = json!("  ");
        let edit: EditMemberFields = serde_json::from_value(body).unwrap();
        assert!(matches!(edit.checked(), Err(MemberError::Invalid(_))));
    }

    #[test]
    fn test_validation() {
        let mut missing_name = fields();
        missing_name.first_name = " ".to_string();
        assert!(matches!(missing_name.validate(), Err(MemberError::Invalid(_))));

        let mut bad_email = fields();
        bad_email.email = Some("rosa".to_string());
        assert!(bad_email.validate().is_err());

        let mut blank_email = fields();
        blank_email.email = Some(String::new());
        assert!(blank_email.validate().is_ok());
    }
}
