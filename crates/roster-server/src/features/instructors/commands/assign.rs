//! Removal and course/event assignment

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record};
use crate::features::instructors::InstructorError;
use crate::features::shared::{accept, require_id};

/// `DELETE /instructors`
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteInstructorCommand {
    pub instructor_id: i32,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker))]
pub async fn delete(
    invoker: &ProcedureInvoker,
    command: DeleteInstructorCommand,
) -> Result<Record, InstructorError> {
    require_id("instructor_id", command.instructor_id)?;

    let call = ProcedureCall::positional(
        "sp_delete_instructor",
        vec![command.instructor_id.into(), command.admin_id.into()],
    );
    accept(invoker.invoke(&call).await?, InstructorError::Rejected)
}

/// `POST /instructors/assign-course`
#[derive(Debug, Clone, Deserialize)]
pub struct AssignCourseCommand {
    pub course_id: i32,
    pub instructor_id: i32,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker))]
pub async fn assign_course(
    invoker: &ProcedureInvoker,
    command: AssignCourseCommand,
) -> Result<Record, InstructorError> {
    require_id("course_id", command.course_id)?;
    require_id("instructor_id", command.instructor_id)?;

    let call = ProcedureCall::positional(
        "sp_assign_instructor_to_course",
        vec![
            command.course_id.into(),
            command.instructor_id.into(),
            command.admin_id.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, InstructorError::Rejected)
}

/// `POST /instructors/assign-event`
#[derive(Debug, Clone, Deserialize)]
pub struct AssignEventCommand {
    pub event_id: i32,
    pub instructor_id: i32,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker))]
pub async fn assign_event(
    invoker: &ProcedureInvoker,
    command: AssignEventCommand,
) -> Result<Record, InstructorError> {
    require_id("event_id", command.event_id)?;
    require_id("instructor_id", command.instructor_id)?;

    let call = ProcedureCall::positional(
        "sp_assign_instructor_to_event",
        vec![
            command.event_id.into(),
            command.instructor_id.into(),
            command.admin_id.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, InstructorError::Rejected)
}
