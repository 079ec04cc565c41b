//! Instructor API routes
//!
//! - `GET /api/v1/instructors` - List with filters
//! - `GET /api/v1/instructors/:id` - Instructor with assigned courses and events
//! - `POST /api/v1/instructors` - Register
//! - `PUT /api/v1/instructors` - Update
//! - `DELETE /api/v1/instructors` - Remove
//! - `POST /api/v1/instructors/assign-course` - Assign to a course
//! - `POST /api/v1/instructors/assign-event` - Assign to an event

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::{
    commands::{
        self, AssignCourseCommand, AssignEventCommand, DeleteInstructorCommand,
        RegisterInstructorCommand, UpdateInstructorCommand,
    },
    queries::{self, ListInstructorsQuery},
};
use crate::api::ApiResponse;
use crate::db::ProcedureInvoker;
use crate::error::ApiResult;

pub fn instructors_routes() -> Router<ProcedureInvoker> {
    Router::new()
        .route(
            "/",
            get(list_instructors)
                .post(register_instructor)
                .put(update_instructor)
                .delete(delete_instructor),
        )
        .route("/assign-course", post(assign_course))
        .route("/assign-event", post(assign_event))
        .route("/:id", get(instructor_detail))
}

async fn list_instructors(
    State(invoker): State<ProcedureInvoker>,
    Query(query): Query<ListInstructorsQuery>,
) -> ApiResult<Response> {
    let listing = queries::list::list(&invoker, query).await?;
    Ok(ApiResponse::success(listing).into_response())
}

/// Instructor with assignments
///
/// - `200 OK` - `{instructor, courses, events}`
/// - `404 Not Found` - Unknown instructor
async fn instructor_detail(
    State(invoker): State<ProcedureInvoker>,
    Path(instructor_id): Path<i32>,
) -> ApiResult<Response> {
    let detail = queries::list::detail(&invoker, instructor_id).await?;
    Ok(ApiResponse::success(detail).into_response())
}

async fn register_instructor(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<RegisterInstructorCommand>,
) -> ApiResult<Response> {
    let record = commands::save::register(&invoker, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

async fn update_instructor(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<UpdateInstructorCommand>,
) -> ApiResult<Response> {
    let record = commands::save::update(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn delete_instructor(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<DeleteInstructorCommand>,
) -> ApiResult<Response> {
    let record = commands::assign::delete(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn assign_course(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<AssignCourseCommand>,
) -> ApiResult<Response> {
    let record = commands::assign::assign_course(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn assign_event(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<AssignEventCommand>,
) -> ApiResult<Response> {
    let record = commands::assign::assign_event(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}
