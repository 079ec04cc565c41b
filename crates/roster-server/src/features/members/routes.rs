//! Member API routes
//!
//! - `POST /api/v1/members/search` - Free-text search
//! - `POST /api/v1/members/search-by-hash` - Lookup by public hash
//! - `GET /api/v1/members` - Paged listing with filters
//! - `POST /api/v1/members` - Create a member
//! - `PUT /api/v1/members/state` - Change a member's state
//! - `PUT /api/v1/members/rank` - Change a member's rank
//! - `GET /api/v1/members/export` - Unpaged listing for export
//! - `GET /api/v1/members/applicants` - Paged applicant listing
//! - `GET /api/v1/members/applicants/:id` - Applicant detail
//! - `GET|PUT|DELETE /api/v1/members/:id` - Detail, edit, permanent delete
//! - `GET /api/v1/members/:id/history` - Change history
//! - `GET|PUT|DELETE /api/v1/members/:id/photo` - Profile photo
//! - `GET|PUT /api/v1/members/:id/courses` - Courses and certifications

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::{
    commands::{
        self,
        photo::DEFAULT_PHOTO_ADMIN_ID,
        ChangeRankCommand, ChangeStateCommand, DeleteMemberCommand, EditMemberFields, MemberFields,
        PhotoUpload, UpdateCoursesCommand, MAX_PHOTO_BYTES,
    },
    queries::{
        self, ExportMembersQuery, ListApplicantsQuery, ListMembersQuery, SearchByHashQuery,
        SearchMembersQuery,
    },
    MemberError,
};
use crate::api::{ApiResponse, PaginationMeta};
use crate::db::ProcedureInvoker;
use crate::error::ApiResult;
use crate::features::shared::PaginationParams;

const PHOTO_FIELD: &str = "photo";

/// Multipart framing allowance on top of the image itself
const PHOTO_BODY_OVERHEAD: usize = 64 * 1024;

pub fn members_routes() -> Router<ProcedureInvoker> {
    Router::new()
        .route("/search", post(search))
        .route("/search-by-hash", post(search_by_hash))
        .route("/", get(list_members).post(create_member))
        .route("/state", put(change_state))
        .route("/rank", put(change_rank))
        .route("/export", get(export_members))
        .route("/applicants", get(list_applicants))
        .route("/applicants/:id", get(applicant_detail))
        .route(
            "/:id",
            get(member_detail).put(edit_member).delete(delete_member),
        )
        .route("/:id/history", get(member_history))
        .route(
            "/:id/photo",
            get(member_photo)
                .put(upload_photo)
                .delete(delete_photo)
                .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + PHOTO_BODY_OVERHEAD)),
        )
        .route("/:id/courses", get(member_courses).put(update_courses))
}

/// `admin_id` query parameter of the photo routes
#[derive(Debug, Deserialize)]
struct PhotoAdminQuery {
    #[serde(default = "default_photo_admin")]
    admin_id: i32,
}

fn default_photo_admin() -> i32 {
    DEFAULT_PHOTO_ADMIN_ID
}

/// Search members by name, national id or file number
///
/// - `200 OK` - `{status: "SUCCESS" | "NO_MATCHES", results}`
/// - `400 Bad Request` - Blank criteria
async fn search(
    State(invoker): State<ProcedureInvoker>,
    Json(query): Json<SearchMembersQuery>,
) -> ApiResult<Response> {
    let response = queries::search::search(&invoker, query).await?;
    Ok(ApiResponse::success(response).into_response())
}

/// Look a member up by `hash_id(id)`
///
/// - `200 OK` - Member record with its hash
/// - `400 Bad Request` - Not 32 lowercase hex characters
/// - `404 Not Found` - No member with that hash
async fn search_by_hash(
    State(invoker): State<ProcedureInvoker>,
    Json(query): Json<SearchByHashQuery>,
) -> ApiResult<Response> {
    let member = queries::search::search_by_hash(&invoker, query).await?;
    Ok(ApiResponse::success(member).into_response())
}

async fn list_members(
    State(invoker): State<ProcedureInvoker>,
    Query(query): Query<ListMembersQuery>,
) -> ApiResult<Response> {
    let paging = PaginationParams::new(query.page, query.per_page);
    let listing = queries::list::list_members(&invoker, query).await?;
    let meta = PaginationMeta::new(paging.page().into(), paging.per_page().into(), listing.total);
    Ok(ApiResponse::success_with_meta(listing, meta.into_value()).into_response())
}

async fn create_member(
    State(invoker): State<ProcedureInvoker>,
    Json(fields): Json<MemberFields>,
) -> ApiResult<Response> {
    let saved = commands::save::create(&invoker, fields).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(saved))).into_response())
}

async fn edit_member(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
    Json(fields): Json<EditMemberFields>,
) -> ApiResult<Response> {
    let saved = commands::save::edit(&invoker, member_id, fields).await?;
    Ok(ApiResponse::success(saved).into_response())
}

async fn change_state(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<ChangeStateCommand>,
) -> ApiResult<Response> {
    let record = commands::status::change_state(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn change_rank(
    State(invoker): State<ProcedureInvoker>,
    Json(command): Json<ChangeRankCommand>,
) -> ApiResult<Response> {
    let record = commands::status::change_rank(&invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn export_members(
    State(invoker): State<ProcedureInvoker>,
    Query(query): Query<ExportMembersQuery>,
) -> ApiResult<Response> {
    let listing = queries::list::export_members(&invoker, query).await?;
    Ok(ApiResponse::success(listing).into_response())
}

async fn list_applicants(
    State(invoker): State<ProcedureInvoker>,
    Query(query): Query<ListApplicantsQuery>,
) -> ApiResult<Response> {
    let paging = PaginationParams::new(query.page, query.per_page);
    let listing = queries::list::list_applicants(&invoker, query).await?;
    let meta = PaginationMeta::new(paging.page().into(), paging.per_page().into(), listing.total);
    Ok(ApiResponse::success_with_meta(listing, meta.into_value()).into_response())
}

async fn applicant_detail(
    State(invoker): State<ProcedureInvoker>,
    Path(applicant_id): Path<i32>,
) -> ApiResult<Response> {
    let applicant = queries::list::applicant_detail(&invoker, applicant_id).await?;
    Ok(ApiResponse::success(applicant).into_response())
}

/// Member header, courses and events
///
/// - `200 OK` - `{member, courses, events}`
/// - `404 Not Found` - Unknown member
async fn member_detail(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
) -> ApiResult<Response> {
    let detail = queries::detail::detail(&invoker, member_id).await?;
    Ok(ApiResponse::success(detail).into_response())
}

async fn member_history(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
) -> ApiResult<Response> {
    let history = queries::detail::history(&invoker, member_id).await?;
    Ok(ApiResponse::success(history).into_response())
}

/// Permanently delete a member
///
/// - `200 OK` - Procedure outcome row
/// - `400 Bad Request` - `confirm` missing or false
async fn delete_member(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
    Json(command): Json<DeleteMemberCommand>,
) -> ApiResult<Response> {
    let record = commands::delete::delete(&invoker, member_id, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn member_photo(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
) -> ApiResult<Response> {
    let photo = queries::detail::photo(&invoker, member_id).await?;
    Ok(ApiResponse::success(photo).into_response())
}

/// Replace the photo with the multipart field `photo`
///
/// - `200 OK` - Procedure outcome row
/// - `400 Bad Request` - Missing field, unsupported type or larger than 2 MB
async fn upload_photo(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
    Query(query): Query<PhotoAdminQuery>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let upload = read_photo(multipart).await?;
    let record = commands::photo::upload(&invoker, member_id, query.admin_id, upload).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn delete_photo(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
    Query(query): Query<PhotoAdminQuery>,
) -> ApiResult<Response> {
    let record = commands::photo::remove(&invoker, member_id, query.admin_id).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn member_courses(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
) -> ApiResult<Response> {
    let courses = queries::detail::courses(&invoker, member_id).await?;
    Ok(ApiResponse::success(courses).into_response())
}

async fn update_courses(
    State(invoker): State<ProcedureInvoker>,
    Path(member_id): Path<i32>,
    Json(command): Json<UpdateCoursesCommand>,
) -> ApiResult<Response> {
    let record = commands::courses::update_courses(&invoker, member_id, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn read_photo(mut multipart: Multipart) -> Result<PhotoUpload, MemberError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        MemberError::Validation(format!("Invalid photo upload: {}", e.body_text()))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(invalid)?;
        return Ok(PhotoUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(MemberError::Validation(
        "The multipart field 'photo' is required".to_string(),
    ))
}
