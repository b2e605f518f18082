use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Mailer, OutgoingEmail};

/// Best-effort email dispatch.
///
/// Requests hand rendered emails to [`EmailQueue::enqueue`] and return
/// immediately; a single worker task delivers them in order. Delivery failures
/// are logged and dropped, they never reach the request that queued the email.
#[derive(Clone)]
pub struct EmailQueue {
    tx: mpsc::UnboundedSender<OutgoingEmail>,
    from: Arc<str>,
}

impl EmailQueue {
    /// Spawn the delivery worker. Must be called inside a tokio runtime.
    pub fn start(mailer: Arc<dyn Mailer>, from: &str) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver(mailer, rx));
        (
            Self {
                tx,
                from: Arc::from(from),
            },
            worker,
        )
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    pub fn enqueue(&self, to: &str, subject: String, html: String) {
        let email = OutgoingEmail {
            to: to.to_string(),
            from: self.from.to_string(),
            subject,
            html,
        };
        if let Err(e) = self.tx.send(email) {
            tracing::warn!(to = %e.0.to, "Email queue closed, dropping email");
        }
    }
}

async fn deliver(mailer: Arc<dyn Mailer>, mut rx: mpsc::UnboundedReceiver<OutgoingEmail>) {
    while let Some(email) = rx.recv().await {
        match mailer.send(&email).await {
            Ok(()) => tracing::info!(to = %email.to, subject = %email.subject, "Email sent"),
            Err(e) => tracing::warn!(to = %email.to, error = %e, "Email delivery failed"),
        }
    }
    tracing::info!("Email queue drained");
}
