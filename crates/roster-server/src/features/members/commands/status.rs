//! State and rank changes; both are audited by the procedure with a reason

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record};
use crate::features::members::MemberError;
use crate::features::shared::{accept, require_id, require_text};

/// `PUT /members/state`
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStateCommand {
    pub member_id: i32,
    pub new_state: String,
    pub reason: String,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker), fields(member_id = command.member_id))]
pub async fn change_state(
    invoker: &ProcedureInvoker,
    command: ChangeStateCommand,
) -> Result<Record, MemberError> {
    require_id("member_id", command.member_id)?;
    require_text("new_state", &command.new_state)?;
    require_text("reason", &command.reason)?;

    let call = ProcedureCall::positional(
        "sp_set_member_state",
        vec![
            command.member_id.into(),
            command.new_state.into(),
            command.reason.into(),
            command.admin_id.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, MemberError::Rejected)
}

/// `PUT /members/rank`
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRankCommand {
    pub member_id: i32,
    pub new_rank: String,
    pub reason: Option<String>,
    pub admin_id: i32,
}

#[tracing::instrument(skip(invoker), fields(member_id = command.member_id))]
pub async fn change_rank(
    invoker: &ProcedureInvoker,
    command: ChangeRankCommand,
) -> Result<Record, MemberError> {
    require_id("member_id", command.member_id)?;
    require_text("new_rank", &command.new_rank)?;

    let call = ProcedureCall::positional(
        "sp_set_member_rank",
        vec![
            command.member_id.into(),
            command.new_rank.into(),
            command.reason.into(),
            command.admin_id.into(),
        ],
    );
    accept(invoker.invoke(&call).await?, MemberError::Rejected)
}
