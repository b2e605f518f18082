//! Outgoing email: the [`Mailer`] boundary, its transports, the HTML
//! templates and the background [`EmailQueue`].

mod queue;
mod smtp;
pub mod templates;

pub use queue::EmailQueue;
pub use smtp::{SmtpConfig, SmtpMailer};

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid address '{address}': {message}")]
    Address { address: String, message: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Delivery refused for {0}")]
    Refused(String),
}

/// A fully rendered email
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Writes each email to the log instead of delivering it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.html.len(),
            "Email not delivered (log transport)"
        );
        Ok(())
    }
}

/// Test transport: keeps every email in memory instead of delivering it.
///
/// Recipients listed in `refuse` fail delivery. Not selectable through
/// `MAIL_TRANSPORT`; the binary only builds [`SmtpMailer`] or [`LogMailer`].
/// Public so the integration tests under `tests/` can inspect what was sent.
#[derive(Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    refuse: Vec<String>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            refuse: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Poll until at least `count` emails were delivered or `timeout` passes
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<OutgoingEmail> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.refuse.contains(&email.to) {
            return Err(MailError::Refused(email.to.clone()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }
        Ok(())
    }
}
