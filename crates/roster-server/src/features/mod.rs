//! Feature slices of the Roster API
//!
//! Each slice is a vertical cut with its own `commands/` (writes),
//! `queries/` (reads) and `routes.rs`. Handlers are thin: they validate the
//! request, build a [`ProcedureCall`](crate::db::ProcedureCall) and shape the
//! rows that come back.
//!
//! - **auth**: two-step login with emailed one-time codes, administrators
//! - **members**: member records, applicants, photos and courses
//! - **instructors**: instructor records and assignments

pub mod auth;
pub mod instructors;
pub mod members;
pub mod shared;

use axum::Router;

use crate::db::ProcedureInvoker;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Every database call goes through the invoker
    pub invoker: ProcedureInvoker,
    /// Login state machine; also owns the mailer
    pub login: auth::LoginFlow,
}

/// Mounts every slice under its path prefix
///
/// - `/auth` - Login and administrators
/// - `/members` - Member records
/// - `/instructors` - Instructor records
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/auth", auth::auth_routes().with_state(state.clone()))
        .nest("/members", members::members_routes().with_state(state.invoker.clone()))
        .nest(
            "/instructors",
            instructors::instructors_routes().with_state(state.invoker.clone()),
        )
}
