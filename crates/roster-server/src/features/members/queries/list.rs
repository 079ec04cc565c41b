//! Paged member and applicant listings, plus the export feed
//!
//! Each page comes from a listing procedure and its total from a companion
//! count procedure taking the same filters. Blank filters are sent as NULL.

use serde::{Deserialize, Serialize};

use crate::db::{ProcedureCall, ProcedureInvoker, Record, SqlValue};
use crate::features::members::{single, MemberError};
use crate::features::shared::{total_of, PaginationParams};

/// A page of rows and the total across all pages
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub total: i64,
    pub data: Vec<Record>,
}

/// `GET /members?search&state&rank&department&page&per_page`
///
/// Pagination fields are declared inline: query strings cannot carry
/// numbers through `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMembersQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub rank: Option<String>,
    pub department: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

impl ListMembersQuery {
    fn filters(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::non_blank(self.search.as_deref()),
            SqlValue::non_blank(self.state.as_deref()),
            SqlValue::non_blank(self.rank.as_deref()),
            SqlValue::non_blank(self.department.as_deref()),
        ]
    }
}

fn paging(page: Option<i32>, per_page: Option<i32>) -> Result<PaginationParams, MemberError> {
    let params = PaginationParams::new(page, per_page);
    params
        .validate()
        .map_err(|e| MemberError::Validation(e.to_string()))?;
    Ok(params)
}

#[tracing::instrument(skip(invoker))]
pub async fn list_members(
    invoker: &ProcedureInvoker,
    query: ListMembersQuery,
) -> Result<Listing, MemberError> {
    let paging = paging(query.page, query.per_page)?;

    let mut params = query.filters();
    params.push(paging.page().into());
    params.push(paging.per_page().into());
    let data = invoker
        .invoke(&ProcedureCall::positional("sp_list_members", params))
        .await?
        .into_data_rows();

    let count = invoker
        .invoke(&ProcedureCall::positional("sp_count_members", query.filters()))
        .await?;

    Ok(Listing {
        total: total_of(&count),
        data,
    })
}

/// `GET /members/export?state&rank&department`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportMembersQuery {
    pub state: Option<String>,
    pub rank: Option<String>,
    pub department: Option<String>,
}

#[tracing::instrument(skip(invoker))]
pub async fn export_members(
    invoker: &ProcedureInvoker,
    query: ExportMembersQuery,
) -> Result<Listing, MemberError> {
    let call = ProcedureCall::positional(
        "sp_export_members",
        vec![
            SqlValue::non_blank(query.state.as_deref()),
            SqlValue::non_blank(query.rank.as_deref()),
            SqlValue::non_blank(query.department.as_deref()),
        ],
    );
    let data = invoker.invoke(&call).await?.into_data_rows();

    Ok(Listing {
        total: data.len() as i64,
        data,
    })
}

/// `GET /members/applicants?search&department&pending_only&page&per_page`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListApplicantsQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub pending_only: bool,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

impl ListApplicantsQuery {
    fn filters(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::non_blank(self.search.as_deref()),
            SqlValue::non_blank(self.department.as_deref()),
            self.pending_only.into(),
        ]
    }
}

#[tracing::instrument(skip(invoker))]
pub async fn list_applicants(
    invoker: &ProcedureInvoker,
    query: ListApplicantsQuery,
) -> Result<Listing, MemberError> {
    let paging = paging(query.page, query.per_page)?;

    let mut params = query.filters();
    params.push(paging.page().into());
    params.push(paging.per_page().into());
    let data = invoker
        .invoke(&ProcedureCall::positional("sp_list_applicants", params))
        .await?
        .into_data_rows();

    let count = invoker
        .invoke(&ProcedureCall::positional("sp_count_applicants", query.filters()))
        .await?;

    Ok(Listing {
        total: total_of(&count),
        data,
    })
}

/// `GET /members/applicants/:id`
#[tracing::instrument(skip(invoker))]
pub async fn applicant_detail(
    invoker: &ProcedureInvoker,
    applicant_id: i32,
) -> Result<Record, MemberError> {
    let result = invoker
        .invoke(&ProcedureCall::positional(
            "sp_applicant_detail",
            vec![applicant_id.into()],
        ))
        .await?;
    single(result, &format!("Applicant {}", applicant_id))
}
