use async_trait::async_trait;

use crate::identity::errors::NotificationError;
use crate::identity::models::Notification;
use crate::identity::ports::Notifier;

/// Notifier for running without a mail relay.
///
/// Records that a message would have gone out. The body carries the
/// one-time code, so only the envelope is logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        tracing::info!(
            to = %notification.recipient,
            subject = %notification.subject,
            "Mail delivery disabled, notification dropped"
        );
        Ok(())
    }
}
