//! Auth API routes
//!
//! - `POST /api/v1/auth/login` - Check credentials and mail a one-time code
//! - `POST /api/v1/auth/login/verify-otp` - Exchange the code for the admin profile
//! - `POST /api/v1/auth/admins` - Create an administrator
//! - `GET /api/v1/auth/admins` - List administrators
//! - `PUT /api/v1/auth/admins/profile` - Update own profile
//! - `PUT /api/v1/auth/admins/password` - Reset another administrator's password
//! - `PUT /api/v1/auth/admins/state` - Activate or deactivate an administrator
//! - `POST /api/v1/auth/session` - Check that a session is still valid

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};

use super::{
    commands::{
        self, ChangeAdminPasswordCommand, CreateAdminCommand, LoginCommand, SetAdminStateCommand,
        UpdateAdminProfileCommand, VerifyOtpCommand,
    },
    queries::{self, CheckSessionQuery, ListAdminsQuery},
};
use crate::api::ApiResponse;
use crate::error::ApiResult;
use crate::features::FeatureState;

pub fn auth_routes() -> Router<FeatureState> {
    Router::new()
        .route("/login", post(login))
        .route("/login/verify-otp", post(verify_otp))
        .route("/admins", post(create_admin).get(list_admins))
        .route("/admins/profile", put(update_profile))
        .route("/admins/password", put(change_password))
        .route("/admins/state", put(set_admin_state))
        .route("/session", post(check_session))
}

/// Credential step
///
/// - `200 OK` - `{status: "2FA_REQUIRED", admin_id, message}`
/// - `401 Unauthorized` - Bad credentials
/// - `502 Bad Gateway` - Code saved but the mail could not be sent
async fn login(
    State(state): State<FeatureState>,
    Json(command): Json<LoginCommand>,
) -> ApiResult<Response> {
    let response = commands::login::handle_login(&state.login, command).await?;
    Ok(ApiResponse::success(response).into_response())
}

/// Code step
///
/// - `200 OK` - `{status: "LOGIN_SUCCESS", admin}`
/// - `400 Bad Request` - Code is not six digits
/// - `401 Unauthorized` - Wrong or expired code
/// - `404 Not Found` - Administrator vanished between the steps
async fn verify_otp(
    State(state): State<FeatureState>,
    Json(command): Json<VerifyOtpCommand>,
) -> ApiResult<Response> {
    let response = commands::login::handle_verify(&state.login, command).await?;
    Ok(ApiResponse::success(response).into_response())
}

async fn create_admin(
    State(state): State<FeatureState>,
    Json(command): Json<CreateAdminCommand>,
) -> ApiResult<Response> {
    let record = commands::admins::create(&state.invoker, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))).into_response())
}

async fn update_profile(
    State(state): State<FeatureState>,
    Json(command): Json<UpdateAdminProfileCommand>,
) -> ApiResult<Response> {
    let record = commands::admins::update_profile(&state.invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn change_password(
    State(state): State<FeatureState>,
    Json(command): Json<ChangeAdminPasswordCommand>,
) -> ApiResult<Response> {
    let record = commands::admins::change_password(&state.invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn set_admin_state(
    State(state): State<FeatureState>,
    Json(command): Json<SetAdminStateCommand>,
) -> ApiResult<Response> {
    let record = commands::admins::set_state(&state.invoker, command).await?;
    Ok(ApiResponse::success(record).into_response())
}

async fn list_admins(
    State(state): State<FeatureState>,
    Query(query): Query<ListAdminsQuery>,
) -> ApiResult<Response> {
    let admins = queries::admins::list(&state.invoker, query).await?;
    Ok(ApiResponse::success(admins).into_response())
}

async fn check_session(
    State(state): State<FeatureState>,
    Json(query): Json<CheckSessionQuery>,
) -> ApiResult<Response> {
    let record = queries::admins::check_session(&state.invoker, query).await?;
    Ok(ApiResponse::success(record).into_response())
}
