//! Stored procedure execution layer
//!
//! Every handler reaches the database through [`ProcedureInvoker`]: one pooled
//! connection per call, one transaction per connection, commit after every
//! successful call and unconditional release on every exit path.

pub mod call;
pub mod connection;
pub mod invoker;
pub mod serialize;
pub mod value;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use call::{ProcedureCall, ProcedureParams};
pub use connection::{ConnectionSource, PgConnectionSource, ProcedureConnection};
pub use invoker::{ProcedureInvoker, ProcedureResult};
pub use serialize::{serialize_row, serialize_value, Record};
pub use value::SqlValue;

/// Procedure layer errors
///
/// Execution failures are not split by category: connectivity loss,
/// parameter mismatch and errors raised inside a procedure all land in
/// [`ProcedureError::Execution`] with the driver's message.
#[derive(Error, Debug)]
pub enum ProcedureError {
    /// Rejected before a connection was acquired
    #[error("Invalid procedure call: {0}")]
    InvalidCall(String),

    #[error("Procedure execution failed: {0}")]
    Execution(String),

    /// A lookup that required exactly one row found none
    #[error("{0}")]
    NotFound(String),
}

impl ProcedureError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(format!("{} not found", what.into()))
    }
}

impl From<sqlx::Error> for ProcedureError {
    fn from(err: sqlx::Error) -> Self {
        Self::Execution(err.to_string())
    }
}

/// Build the connection pool
///
/// `connect_timeout_secs` bounds pool acquisition; `max_lifetime_secs`
/// recycles connections so none outlive a server-side idle kill.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
