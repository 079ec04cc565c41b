//! Two-step administrator login
//!
//! ```text
//! AWAITING_CREDENTIALS --begin()--> AWAITING_OTP --verify()--> AUTHENTICATED
//!          |                             |
//!          +---------> REJECTED <--------+
//! ```
//!
//! Nothing is kept in memory between the two steps. The issued code lives in
//! the database (`sp_save_admin_otp`) and expiry is enforced there by
//! `sp_validate_admin_otp`. Issuing a new code for the same administrator
//! overwrites the previous one; verification attempts are not counted.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::db::invoker::STATUS_SUCCESS;
use crate::db::{ProcedureCall, ProcedureError, ProcedureInvoker, ProcedureResult, Record, SqlValue};
use crate::error::AppError;
use crate::features::shared::ValidationError;
use crate::mail::{MailError, Mailer, OutgoingMail};

pub const OTP_LENGTH: usize = 6;
const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

pub const VALIDATE_LOGIN_PROCEDURE: &str = "sp_validate_admin_login";
pub const SAVE_OTP_PROCEDURE: &str = "sp_save_admin_otp";
pub const VALIDATE_OTP_PROCEDURE: &str = "sp_validate_admin_otp";

pub const PROFILE_QUERY: &str = "SELECT id AS admin_id, username, full_name, email, role, \
     profile_photo, active, last_login FROM admin_users WHERE id = $1";

pub const OTP_SUBJECT: &str = "Verification code";

pub type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired code")]
    InvalidCode,

    #[error("The code must be exactly 6 digits")]
    MalformedCode,

    #[error("Admin {0} not found")]
    AdminNotFound(i32),

    #[error("OTP lifetime of {0:?} cannot be added to the current time")]
    LifetimeOutOfRange(Duration),

    #[error("Verification code could not be delivered: {0}")]
    Delivery(#[from] MailError),

    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Invalid(e) => AppError::Validation(e.to_string()),
            LoginError::MalformedCode => AppError::Validation(err.to_string()),
            LoginError::InvalidCredentials | LoginError::InvalidCode => {
                AppError::Unauthorized(err.to_string())
            },
            LoginError::AdminNotFound(_) => AppError::NotFound(err.to_string()),
            LoginError::LifetimeOutOfRange(_) => AppError::Internal(err.to_string()),
            LoginError::Delivery(e) => AppError::Delivery(e.to_string()),
            LoginError::Procedure(e) => e.into(),
        }
    }
}

/// Issued challenge; the code itself only travels by mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub admin_id: i32,
    pub expires_at: DateTime<Utc>,
}

/// Uniform over 100000..=999999
pub fn random_code() -> String {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX).to_string()
}

/// Exactly six ASCII digits
pub fn is_otp_code(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// The message carrying a code
pub fn otp_mail(to: &str, code: &str, ttl: Duration) -> OutgoingMail {
    let secs = ttl.as_secs();
    let lifetime = if secs % 60 == 0 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} seconds", secs)
    };

    OutgoingMail {
        to: to.to_string(),
        subject: OTP_SUBJECT.to_string(),
        body: format!(
            "Hello,\n\nYour verification code is: {}\n\nThis code expires in {}.\n\
             If you did not try to sign in, ignore this message.\n",
            code, lifetime
        ),
    }
}

/// Administrator id from a credential check row: `admin_id`, else `id`
fn admin_id_of(record: &Record) -> Option<i32> {
    ["admin_id", "id"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

/// A real row reporting `status = "SUCCESS"`
fn succeeded(result: &ProcedureResult) -> bool {
    result.produced_rows() && result.status() == Some(STATUS_SUCCESS)
}

/// Orchestrates the login steps over the invoker and a mailer
#[derive(Clone)]
pub struct LoginFlow {
    invoker: ProcedureInvoker,
    mailer: Arc<dyn Mailer>,
    ttl: Duration,
    generate_code: CodeGenerator,
    clock: Clock,
}

impl LoginFlow {
    pub fn new(invoker: ProcedureInvoker, mailer: Arc<dyn Mailer>, ttl: Duration) -> Self {
        Self {
            invoker,
            mailer,
            ttl,
            generate_code: Arc::new(random_code),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_code_generator(mut self, generate: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generate_code = Arc::new(generate);
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check credentials, then issue, persist and mail a code
    ///
    /// A delivery failure is reported after the code has been saved; the
    /// saved code is left in place.
    #[tracing::instrument(skip(self, password), fields(email = %email))]
    pub async fn begin(&self, email: &str, password: &str) -> Result<OtpChallenge, LoginError> {
        let check = self
            .invoker
            .invoke(&ProcedureCall::positional(
                VALIDATE_LOGIN_PROCEDURE,
                vec![email.into(), password.into()],
            ))
            .await?;

        if !succeeded(&check) {
            tracing::info!("Credential check rejected");
            return Err(LoginError::InvalidCredentials);
        }
        let admin_id = check
            .first()
            .and_then(admin_id_of)
            .ok_or(LoginError::InvalidCredentials)?;

        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| (self.clock)().checked_add_signed(ttl))
            .ok_or(LoginError::LifetimeOutOfRange(self.ttl))?;
        let code = (self.generate_code)();

        self.invoker
            .invoke(&ProcedureCall::positional(
                SAVE_OTP_PROCEDURE,
                vec![admin_id.into(), code.as_str().into(), SqlValue::from(expires_at)],
            ))
            .await?;
        tracing::info!(admin_id, expires_at = %expires_at, "One-time code issued");

        self.mailer.send(otp_mail(email, &code, self.ttl)).await?;

        Ok(OtpChallenge {
            admin_id,
            expires_at,
        })
    }

    /// Check a submitted code and return the administrator profile
    #[tracing::instrument(skip(self, code))]
    pub async fn verify(&self, admin_id: i32, code: &str) -> Result<Record, LoginError> {
        if !is_otp_code(code) {
            return Err(LoginError::MalformedCode);
        }

        let check = self
            .invoker
            .invoke(&ProcedureCall::positional(
                VALIDATE_OTP_PROCEDURE,
                vec![admin_id.into(), code.into()],
            ))
            .await?;

        if !succeeded(&check) {
            tracing::info!(admin_id, "One-time code rejected");
            return Err(LoginError::InvalidCode);
        }

        let profile = self
            .invoker
            .query(PROFILE_QUERY, &[SqlValue::from(admin_id)])
            .await?
            .single(&format!("Admin {}", admin_id))
            .map_err(|e| match e {
                ProcedureError::NotFound(_) => LoginError::AdminNotFound(admin_id),
                other => LoginError::Procedure(other),
            })?;

        tracing::info!(admin_id, "Administrator authenticated");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_random_code_shape() {
        for _ in 0..200 {
            let code = random_code();
            assert!(is_otp_code(&code), "{} is not a 6-digit code", code);
            let n: u32 = code.parse().unwrap();
            assert!((OTP_MIN..=OTP_MAX).contains(&n));
        }
    }

    #[test]
    fn test_is_otp_code() {
        assert!(is_otp_code("123456"));
        assert!(is_otp_code("000000"));
        for bad in ["12345", "1234567", "12345a", " 12345", "١٢٣٤٥٦"] {
            assert!(!is_otp_code(bad), "{:?} should be malformed", bad);
        }
    }

    #[test]
    fn test_otp_mail() {
        let mail = otp_mail("admin@example.org", "482913", Duration::from_secs(300));
        assert_eq!(mail.to, "admin@example.org");
        assert_eq!(mail.subject, "Verification code");
        assert!(mail.body.contains("482913"));
        assert!(mail.body.contains("expires in 5 minutes"));
    }

    #[test]
    fn test_admin_id_fallback() {
        let Value::Object(with_admin_id) = json!({"status": "SUCCESS", "admin_id": 7, "id": 99}) else {
            unreachable!()
        };
        assert_eq!(admin_id_of(&with_admin_id), Some(7));

        let Value::Object(with_id) = json!({"status": "SUCCESS", "admin_id": null, "id": 12}) else {
            unreachable!()
        };
        assert_eq!(admin_id_of(&with_id), Some(12));

        let Value::Object(without) = json!({"status": "SUCCESS"}) else {
            unreachable!()
        };
        assert_eq!(admin_id_of(&without), None);
    }

    #[test]
    fn test_login_error_mapping() {
        use axum::response::IntoResponse;
        use axum::http::StatusCode;

        let status = |e: LoginError| AppError::from(e).into_response().status();
        assert_eq!(status(LoginError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(LoginError::InvalidCode), StatusCode::UNAUTHORIZED);
        assert_eq!(status(LoginError::MalformedCode), StatusCode::BAD_REQUEST);
        assert_eq!(status(LoginError::AdminNotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(status(LoginError::Delivery(MailError::NotConfigured)), StatusCode::BAD_GATEWAY);
    }
}
