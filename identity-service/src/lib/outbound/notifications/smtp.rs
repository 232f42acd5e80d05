use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use secrecy::ExposeSecret;

use crate::config::MailConfig;
use crate::identity::errors::NotificationError;
use crate::identity::models::Notification;
use crate::identity::ports::Notifier;

/// Notification gateway delivering plain-text mail over SMTP (STARTTLS).
#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// # Errors
    /// * `BuildFailed` - Sender address or relay host rejected
    pub fn new(config: &MailConfig) -> Result<Self, NotificationError> {
        let from: Mailbox = config.from_address.parse().map_err(|_| {
            NotificationError::BuildFailed(format!(
                "invalid sender address '{}'",
                config.from_address
            ))
        })?;

        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotificationError::BuildFailed(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { mailer, from })
    }

    fn message(&self, notification: &Notification) -> Result<Message, NotificationError> {
        let to: Mailbox = notification
            .recipient
            .parse()
            .map_err(|_| NotificationError::InvalidRecipient(notification.recipient.clone()))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| NotificationError::BuildFailed(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let message = self.message(notification)?;

        self.mailer.send(message).await.map_err(|e| {
            tracing::error!(
                to = %notification.recipient,
                subject = %notification.subject,
                "SMTP delivery failed: {}",
                e
            );
            NotificationError::DeliveryFailed(e.to_string())
        })?;

        tracing::info!(
            to = %notification.recipient,
            subject = %notification.subject,
            "Email sent successfully"
        );
        Ok(())
    }
}
