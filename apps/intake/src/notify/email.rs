use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{ApplicationNotice, NotificationError, Notifier, EMAIL_SUBJECT};
use crate::config::EmailConfig;

pub const CHANNEL: &str = "email";

/// Sends the application summary over SMTP (Gmail by default), from the
/// authenticated account to the configured recipient.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self, NotificationError> {
        let from: Mailbox = config
            .smtp_user
            .parse()
            .map_err(|e| NotificationError::Email(format!("invalid sender address: {e}")))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .map_err(|e| NotificationError::Email(format!("invalid recipient address: {e}")))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotificationError::Email(format!("invalid SMTP relay: {e}")))?
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self { mailer, from, to })
    }

    fn compose(&self, notice: &ApplicationNotice) -> Result<Message, NotificationError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(EMAIL_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body())
            .map_err(|e| NotificationError::Email(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, notice: &ApplicationNotice) -> Result<(), NotificationError> {
        let message = self.compose(notice)?;
        let response = self
            .mailer
            .send(message)
            .await
            .map_err(|e| NotificationError::Email(e.to_string()))?;
        debug!("SMTP accepted notification: {:?}", response.code());
        Ok(())
    }

    fn channel(&self) -> &'static str {
        CHANNEL
    }
}
