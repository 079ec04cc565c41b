//! Permanent member deletion

use serde::Deserialize;

use crate::db::{ProcedureCall, ProcedureInvoker, Record};
use crate::features::members::MemberError;
use crate::features::shared::accept;

/// `DELETE /members/:id` body; nothing is deleted unless `confirm` is true
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMemberCommand {
    #[serde(default)]
    pub confirm: bool,
}

#[tracing::instrument(skip(invoker))]
pub async fn delete(
    invoker: &ProcedureInvoker,
    member_id: i32,
    command: DeleteMemberCommand,
) -> Result<Record, MemberError> {
    if !command.confirm {
        return Err(MemberError::Validation(
            "Permanent deletion must be explicitly confirmed".to_string(),
        ));
    }

    let call = ProcedureCall::positional(
        "sp_delete_member",
        vec![member_id.into(), i32::from(command.confirm).into()],
    );
    let record = accept(invoker.invoke(&call).await?, MemberError::Rejected)?;

    tracing::warn!(member_id, "Member permanently deleted");
    Ok(record)
}
