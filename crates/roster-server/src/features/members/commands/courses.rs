//! Free-text course and certification list

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record, SqlValue};
use crate::features::members::MemberError;
use crate::features::shared::accept;

/// `PUT /members/:id/courses`, e.g. `{"courses": "BLS, ACLS, First aid", "admin_id": 1}`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCoursesCommand {
    pub courses: Option<String>,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker, command), fields(admin_id = command.admin_id))]
pub async fn update_courses(
    invoker: &ProcedureInvoker,
    member_id: i32,
    command: UpdateCoursesCommand,
) -> Result<Record, MemberError> {
    let call = ProcedureCall::positional(
        "sp_update_member_courses",
        vec![
            member_id.into(),
            SqlValue::non_blank(command.courses.as_deref()),
            command.admin_id.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, MemberError::Rejected)
}
