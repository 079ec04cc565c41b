//! Instructor listing and detail

use serde::{Deserialize, Serialize};

use crate::db::{ProcedureCall, ProcedureError, ProcedureInvoker, Record, SqlValue};
use crate::features::instructors::InstructorError;

/// `GET /instructors?search&specialty&state`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInstructorsQuery {
    pub search: Option<String>,
    pub specialty: Option<String>,
    pub state: Option<String>,
}

/// The listing procedure is unpaged, so `total` is the row count
#[derive(Debug, Clone, Serialize)]
pub struct InstructorListing {
    pub total: usize,
    pub data: Vec<Record>,
}

#[tracing::instrument(skip(invoker))]
pub async fn list(
    invoker: &ProcedureInvoker,
    query: ListInstructorsQuery,
) -> Result<InstructorListing, InstructorError> {
    let call = ProcedureCall::positional(
        "sp_list_instructors",
        vec![
            SqlValue::non_blank(query.search.as_deref()),
            SqlValue::non_blank(query.specialty.as_deref()),
            SqlValue::non_blank(query.state.as_deref()),
        ],
    );
    let data = invoker.invoke(&call).await?.into_data_rows();

    Ok(InstructorListing {
        total: data.len(),
        data,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorDetail {
    pub instructor: Record,
    pub courses: Vec<Record>,
    pub events: Vec<Record>,
}

/// `GET /instructors/:id`
///
/// `sp_instructor_detail` produces three result-sets: instructor, assigned
/// courses, assigned events.
#[tracing::instrument(skip(invoker))]
pub async fn detail(
    invoker: &ProcedureInvoker,
    instructor_id: i32,
) -> Result<InstructorDetail, InstructorError> {
    let result = invoker
        .invoke(&ProcedureCall::positional(
            "sp_instructor_detail",
            vec![instructor_id.into()],
        ))
        .await?;

    let courses = result.result_set(1).to_vec();
    let events = result.result_set(2).to_vec();
    let instructor = result
        .single(&format!("Instructor {}", instructor_id))
        .map_err(|e| match e {
            ProcedureError::NotFound(message) => InstructorError::NotFound(message),
            other => InstructorError::Procedure(other),
        })?;

    Ok(InstructorDetail {
        instructor,
        courses,
        events,
    })
}
