//! Single-member views

use serde::Serialize;
use serde_json::Value;

use crate::db::{ProcedureCall, ProcedureInvoker, Record, SqlValue};
use crate::features::members::{single, MemberError};

const PHOTO_QUERY: &str = "SELECT profile_photo FROM members WHERE id = $1";
const COURSES_QUERY: &str = "SELECT courses_certifications FROM members WHERE id = $1";

/// Member header with the courses and events of the same call
#[derive(Debug, Clone, Serialize)]
pub struct MemberDetail {
    pub member: Record,
    pub courses: Vec<Record>,
    pub events: Vec<Record>,
}

/// `GET /members/:id`
///
/// `sp_member_detail` produces three result-sets: header, courses, events.
#[tracing::instrument(skip(invoker))]
pub async fn detail(invoker: &ProcedureInvoker, member_id: i32) -> Result<MemberDetail, MemberError> {
    let result = invoker
        .invoke(&ProcedureCall::positional("sp_member_detail", vec![member_id.into()]))
        .await?;

    let courses = result.result_set(1).to_vec();
    let events = result.result_set(2).to_vec();
    let member = single(result, &format!("Member {}", member_id))?;

    Ok(MemberDetail {
        member,
        courses,
        events,
    })
}

/// `GET /members/:id/history`
#[tracing::instrument(skip(invoker))]
pub async fn history(invoker: &ProcedureInvoker, member_id: i32) -> Result<Vec<Record>, MemberError> {
    let result = invoker
        .invoke(&ProcedureCall::positional("sp_member_history", vec![member_id.into()]))
        .await?;
    Ok(result.into_data_rows())
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberPhoto {
    pub has_photo: bool,
    /// `data:` URI, or null when the member has no photo
    pub photo: Value,
}

/// `GET /members/:id/photo`
#[tracing::instrument(skip(invoker))]
pub async fn photo(invoker: &ProcedureInvoker, member_id: i32) -> Result<MemberPhoto, MemberError> {
    let result = invoker.query(PHOTO_QUERY, &[SqlValue::from(member_id)]).await?;
    let record = single(result, &format!("Member {}", member_id))?;

    let photo = record.get("profile_photo").cloned().unwrap_or(Value::Null);
    Ok(MemberPhoto {
        has_photo: !photo.is_null(),
        photo,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberCourses {
    pub courses_certifications: String,
}

/// `GET /members/:id/courses`
#[tracing::instrument(skip(invoker))]
pub async fn courses(invoker: &ProcedureInvoker, member_id: i32) -> Result<MemberCourses, MemberError> {
    let result = invoker.query(COURSES_QUERY, &[SqlValue::from(member_id)]).await?;
    let record = single(result, &format!("Member {}", member_id))?;

    Ok(MemberCourses {
        courses_certifications: record
            .get("courses_certifications")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
