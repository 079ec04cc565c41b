//! Member photo upload and removal

use crate::db::{ProcedureCall, ProcedureInvoker, Record};
use crate::features::members::MemberError;
use crate::features::shared::accept;

pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Admin recorded against photo changes when the request names none
pub const DEFAULT_PHOTO_ADMIN_ID: i32 = 1;

/// An uploaded image as received from the multipart form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn validate(&self) -> Result<(), MemberError> {
        let allowed = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ALLOWED_PHOTO_TYPES.contains(&ct));
        if !allowed {
            return Err(MemberError::Validation(
                "Only JPG, PNG or WEBP images are allowed".to_string(),
            ));
        }
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(MemberError::Validation(
                "The image exceeds the 2 MB limit".to_string(),
            ));
        }
        Ok(())
    }
}

#[tracing::instrument(skip(invoker, upload), fields(size = upload.bytes.len()))]
pub async fn upload(
    invoker: &ProcedureInvoker,
    member_id: i32,
    admin_id: i32,
    upload: PhotoUpload,
) -> Result<Record, MemberError> {
    upload.validate()?;

    let call = ProcedureCall::positional(
        "sp_update_member_photo",
        vec![member_id.into(), upload.bytes.into(), admin_id.into()],
    );
    accept(invoker.invoke(&call).await?, MemberError::Rejected)
}

#[tracing::instrument(skip(invoker))]
pub async fn remove(
    invoker: &ProcedureInvoker,
    member_id: i32,
    admin_id: i32,
) -> Result<Record, MemberError> {
    let call = ProcedureCall::positional(
        "sp_delete_member_photo",
        vec![member_id.into(), admin_id.into()],
    );
    accept(invoker.invoke(&call).await?, MemberError::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, size: usize) -> PhotoUpload {
        PhotoUpload {
            content_type: content_type.map(str::to_string),
            bytes: vec![0xFF; size],
        }
    }

    #[test]
    fn test_photo_type_and_size() {
        assert!(upload(Some("image/png"), 1024).validate().is_ok());
        assert!(upload(Some("image/webp"), MAX_PHOTO_BYTES).validate().is_ok());
        assert!(upload(Some("image/gif"), 10).validate().is_err());
        assert!(upload(None, 10).validate().is_err());
        assert!(upload(Some("image/jpeg"), MAX_PHOTO_BYTES + 1).validate().is_err());
    }
}
