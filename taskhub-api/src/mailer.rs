/// Notification dispatcher: fire-and-forget account lifecycle emails
///
/// Welcome and cancellation messages are built from fixed templates and
/// handed to an SMTP transport inside a spawned task, so the HTTP
/// response never waits on delivery. Transport failures are logged and
/// dropped, never retried, and never surfaced to the client.
///
/// The dispatcher is optional: when `SMTP_URL`/`MAIL_FROM` are not
/// configured, sends degrade to a debug log line.
use lettre::{
    message::Mailbox, transport::smtp::AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::MailConfig;

struct MailerInner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Handle to the outbound mail transport; cheap to clone
#[derive(Clone)]
pub struct Mailer {
    inner: Option<Arc<MailerInner>>,
}

impl Mailer {
    /// Builds a mailer from configuration
    ///
    /// Returns a disabled mailer when SMTP settings are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP URL or the sender address is present
    /// but malformed.
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Self> {
        let (Some(smtp_url), Some(from)) = (&config.smtp_url, &config.from) else {
            debug!("SMTP not configured; notification emails disabled");
            return Ok(Self { inner: None });
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(smtp_url)?.build();
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid MAIL_FROM address: {}", e))?;

        Ok(Self {
            inner: Some(Arc::new(MailerInner { transport, from })),
        })
    }

    /// A mailer that drops everything (used by tests)
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Whether a transport is configured
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Sends the welcome email for a fresh signup
    pub fn send_welcome(&self, email: &str, name: &str) {
        self.dispatch(
            email,
            "Thanks for joining us!",
            format!(
                "Welcome to the TaskHub app, {}! Let us know if you need any help.",
                name
            ),
        );
    }

    /// Sends the cancellation email after an account deletion
    pub fn send_cancellation(&self, email: &str, name: &str) {
        self.dispatch(
            email,
            "Sorry to see you go...",
            format!(
                "Hi {}. Sorry to see you cancel. Is there anything we could have done differently?",
                name
            ),
        );
    }

    /// Builds the message and hands it to the transport in a detached task
    fn dispatch(&self, email: &str, subject: &str, body: String) {
        let Some(inner) = self.inner.clone() else {
            debug!(to = email, subject, "Mailer disabled; dropping notification");
            return;
        };

        let to = match email.parse::<Mailbox>() {
            Ok(to) => to,
            Err(e) => {
                warn!(to = email, error = %e, "Invalid recipient address; dropping notification");
                return;
            }
        };

        let message = match Message::builder()
            .from(inner.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
        {
            Ok(message) => message,
            Err(e) => {
                warn!(to = email, error = %e, "Failed to build notification; dropping");
                return;
            }
        };

        let subject = subject.to_string();
        let email = email.to_string();
        tokio::spawn(async move {
            if let Err(e) = inner.transport.send(message).await {
                warn!(to = %email, subject = %subject, error = %e, "Failed to send notification email");
            }
        });
    }
}
