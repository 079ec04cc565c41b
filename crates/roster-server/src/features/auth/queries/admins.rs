//! Administrator listings and session checks

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record};
use crate::features::auth::commands::admins::AdminError;
use crate::features::shared::{accept, require_id};

fn default_active_only() -> bool {
    true
}

/// `GET /auth/admins?active_only=`
#[derive(Debug, Clone, Deserialize)]
pub struct ListAdminsQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

impl Default for ListAdminsQuery {
    fn default() -> Self {
        Self {
            active_only: default_active_only(),
        }
    }
}

#[tracing::instrument(skip(invoker))]
pub async fn list(invoker: &ProcedureInvoker, query: ListAdminsQuery) -> Result<Vec<Record>, AdminError> {
    let result = invoker
        .invoke(&ProcedureCall::positional(
            "sp_list_admins",
            vec![query.active_only.into()],
        ))
        .await?;
    Ok(result.into_data_rows())
}

/// `POST /auth/session`
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSessionQuery {
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker))]
pub async fn check_session(
    invoker: &ProcedureInvoker,
    query: CheckSessionQuery,
) -> Result<Record, AdminError> {
    require_id("admin_id", query.admin_id)?;

    let result = invoker
        .invoke(&ProcedureCall::positional(
            "sp_check_admin_session",
            vec![query.admin_id.into()],
        ))
        .await?;
    accept(result, AdminError::Rejected)
}
