use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ApplicationNotice, NotificationError, Notifier};
use crate::config::MessagingConfig;

pub const CHANNEL: &str = "messaging";

#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sends the application summary through the Twilio Messages API
/// (SMS or WhatsApp, depending on the channel prefix of `from`/`to`).
pub struct MessagingNotifier {
    client: Client,
    messages_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    to: String,
}

impl MessagingNotifier {
    pub fn new(config: &MessagingConfig, timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            messages_url: format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                config.api_base.trim_end_matches('/'),
                config.account_sid
            ),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }
}

#[async_trait]
impl Notifier for MessagingNotifier {
    async fn notify(&self, notice: &ApplicationNotice) -> Result<(), NotificationError> {
        let body = notice.body();
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from.as_str()),
                ("To", self.to.as_str()),
                ("Body", body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(NotificationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: MessageCreated = response.json().await?;
        debug!("Messaging API accepted notification: {}", created.sid);
        Ok(())
    }

    fn channel(&self) -> &'static str {
        CHANNEL
    }
}
