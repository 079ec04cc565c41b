//! Roster Server Library
//!
//! HTTP façade over a PostgreSQL database whose business logic lives in
//! stored functions.
//!
//! # Overview
//!
//! - **Procedure Invoker** ([`db::ProcedureInvoker`]): one pooled connection
//!   per call, commit on success, release always
//! - **Result Serializer** ([`db::serialize_row`]): typed column values to
//!   JSON, binary columns as `data:` URIs
//! - **Two-step login** ([`features::auth::LoginFlow`]): credentials, then an
//!   emailed six-digit code
//! - **Feature slices**: auth, members, instructors under `/api/v1`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use roster_server::{config::Config, db, features, mail::SmtpMailer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let invoker = db::ProcedureInvoker::new(Arc::new(db::PgConnectionSource::new(pool)));
//!     let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
//!     let login = features::auth::LoginFlow::new(invoker.clone(), mailer, config.otp.ttl());
//!     let app = roster_server::create_router(features::FeatureState { invoker, login }, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod mail;
pub mod middleware;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::db::ProcedureInvoker;
use crate::features::FeatureState;

pub use error::{ApiResult, AppError};

/// Build the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.invoker.clone())
        .nest("/api/v1", features::router(state))
        // Layers apply from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Database round trip through the same path every handler uses
async fn health_check(State(invoker): State<ProcedureInvoker>) -> Result<Response, StatusCode> {
    match invoker.query("SELECT 1 AS ok", &[]).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
