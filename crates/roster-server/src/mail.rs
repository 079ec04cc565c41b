//! Outgoing mail
//!
//! The login flow only needs "send this text to that address", so delivery is
//! a trait with an SMTP implementation for production and an in-memory one for
//! tests and local runs.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Mutex;
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail delivery is not configured (set SMTP_USER and SMTP_PASS)")]
    NotConfigured,
}

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// STARTTLS relay authenticated with the configured account, which is also
/// the sender address
pub struct SmtpMailer {
    sender: Option<SmtpSender>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let (Some(user), Some(password)) = (&config.user, &config.password) else {
            return Ok(Self { sender: None });
        };

        let from = Mailbox::new(Some(config.from_name.clone()), parse_address(user)?);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(user.clone(), password.clone()))
            .build();

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer configured");

        Ok(Self {
            sender: Some(SmtpSender { transport, from }),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.sender.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let sender = self.sender.as_ref().ok_or(MailError::NotConfigured)?;

        let message = Message::builder()
            .from(sender.from.clone())
            .to(Mailbox::new(None, parse_address(&mail.to)?))
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        sender
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!(to = %mail.to, "Mail delivered to relay");
        Ok(())
    }
}

/// Keeps messages in memory instead of sending them
///
/// [`MockMailer::failing`] refuses every message, for exercising delivery
/// failures.
#[derive(Debug, Default)]
pub struct MockMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent().len()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("mock transport refused the message".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(mail);
        Ok(())
    }
}
