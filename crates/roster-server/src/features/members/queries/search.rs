//! Public member lookups
//!
//! Both procedures take named parameters. Results carry the member's hash so
//! a client can build a lookup URL without ever seeing sequential ids.

use roster_common::hash_id::validate_hash_id;
use serde::{Deserialize, Serialize};

use crate::db::{ProcedureCall, ProcedureInvoker, Record, SqlValue};
use crate::features::members::{single, with_hash, MemberError};
use crate::features::shared::require_text;

pub const STATUS_NO_MATCHES: &str = "NO_MATCHES";

/// `POST /members/search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchMembersQuery {
    pub criteria: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub status: String,
    pub results: Vec<Record>,
}

#[tracing::instrument(skip(invoker))]
pub async fn search(
    invoker: &ProcedureInvoker,
    query: SearchMembersQuery,
) -> Result<SearchResponse, MemberError> {
    require_text("criteria", &query.criteria)?;

    let call = ProcedureCall::named(
        "sp_search_member",
        vec![("p_criteria", SqlValue::from(query.criteria.trim()))],
    );
    let rows = invoker.invoke(&call).await?.into_data_rows();

    if rows.is_empty() {
        return Ok(SearchResponse {
            status: STATUS_NO_MATCHES.to_string(),
            results: Vec::new(),
        });
    }

    tracing::debug!(matches = rows.len(), "Member search completed");
    Ok(SearchResponse {
        status: "SUCCESS".to_string(),
        results: rows.into_iter().map(with_hash).collect(),
    })
}

/// `POST /members/search-by-hash`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchByHashQuery {
    pub hash: String,
}

#[tracing::instrument(skip(invoker))]
pub async fn search_by_hash(
    invoker: &ProcedureInvoker,
    query: SearchByHashQuery,
) -> Result<Record, MemberError> {
    validate_hash_id(&query.hash).map_err(|e| MemberError::Validation(e.to_string()))?;

    let call = ProcedureCall::named(
        "sp_find_member_by_hash",
        vec![("p_hash", SqlValue::from(query.hash.as_str()))],
    );
    let member = single(invoker.invoke(&call).await?, "Member")?;

    Ok(with_hash(member))
}
