//! Best-effort notifications about new applications.
//!
//! Each channel implements `Notifier`. `NotificationDispatcher::dispatch` launches
//! one detached task per channel and returns immediately; every task reports its
//! `NotificationOutcome` over an mpsc channel whose only consumer is
//! `log_outcomes`. Nothing on the response path ever waits on a notifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::application::{Applicant, ApplicationRecord};

pub mod email;
pub mod messaging;

pub use email::EmailNotifier;
pub use messaging::MessagingNotifier;

pub const EMAIL_SUBJECT: &str = "New Job Application Submitted";

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("messaging API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{channel} notification timed out after {after:?}")]
    Timeout { channel: &'static str, after: Duration },
}

/// What a notifier is told about a new application.
#[derive(Debug, Clone)]
pub struct ApplicationNotice {
    pub application_id: Uuid,
    pub applicant: Applicant,
}

impl ApplicationNotice {
    /// Plain-text body shared by every channel.
    pub fn body(&self) -> String {
        let Applicant {
            name,
            email,
            phone,
            position,
        } = &self.applicant;
        format!(
            "A new job application has been submitted:\n\nName: {name}\nEmail: {email}\nPhone: {phone}\nPosition: {position}"
        )
    }
}

impl From<&ApplicationRecord> for ApplicationNotice {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            application_id: record.id,
            applicant: record.applicant(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &ApplicationNotice) -> Result<(), NotificationError>;

    /// Channel name for logs ("email" | "messaging").
    fn channel(&self) -> &'static str;

    /// True when the channel only writes the notice to the log.
    fn is_log_only(&self) -> bool {
        false
    }
}

/// Stand-in for a channel whose credentials are not configured.
pub struct LogOnlyNotifier {
    channel: &'static str,
}

impl LogOnlyNotifier {
    pub fn new(channel: &'static str) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn notify(&self, notice: &ApplicationNotice) -> Result<(), NotificationError> {
        info!(
            application_id = %notice.application_id,
            "{} notifications not configured; skipping: {}",
            self.channel,
            notice.body().replace('\n', " | ")
        );
        Ok(())
    }

    fn channel(&self) -> &'static str {
        self.channel
    }

    fn is_log_only(&self) -> bool {
        true
    }
}

/// Result of one notifier task.
#[derive(Debug)]
pub struct NotificationOutcome {
    pub channel: &'static str,
    pub application_id: Uuid,
    pub result: Result<(), NotificationError>,
}

/// Fans a notice out to every configured channel without waiting on any of them.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifiers: Arc<[Arc<dyn Notifier>]>,
    timeout: Duration,
    outcomes: mpsc::UnboundedSender<NotificationOutcome>,
}

impl NotificationDispatcher {
    /// Returns the dispatcher and the receiving end of its outcome channel.
    pub fn new(
        notifiers: Vec<Arc<dyn Notifier>>,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<NotificationOutcome>) {
        let (outcomes, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            notifiers: notifiers.into(),
            timeout,
            outcomes,
        };
        (dispatcher, rx)
    }

    /// Channel names, with log-only stand-ins marked as such.
    pub fn channels(&self) -> Vec<String> {
        self.notifiers
            .iter()
            .map(|n| {
                if n.is_log_only() {
                    format!("{} (log-only)", n.channel())
                } else {
                    n.channel().to_string()
                }
            })
            .collect()
    }

    /// Launches one detached task per notifier. Never blocks and never fails.
    pub fn dispatch(&self, record: &ApplicationRecord) {
        let notice = Arc::new(ApplicationNotice::from(record));

        for notifier in self.notifiers.iter() {
            let notifier = Arc::clone(notifier);
            let notice = Arc::clone(&notice);
            let outcomes = self.outcomes.clone();
            let timeout = self.timeout;

            tokio::spawn(async move {
                let channel = notifier.channel();
                let result = match tokio::time::timeout(timeout, notifier.notify(&notice)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(NotificationError::Timeout {
                        channel,
                        after: timeout,
                    }),
                };

                // Send fails only once the logging task is gone (shutdown).
                let _ = outcomes.send(NotificationOutcome {
                    channel,
                    application_id: notice.application_id,
                    result,
                });
            });
        }
    }
}

/// Drains notification outcomes into the log. Runs for the lifetime of the server.
pub async fn log_outcomes(mut rx: mpsc::UnboundedReceiver<NotificationOutcome>) {
    while let Some(outcome) = rx.recv().await {
        match outcome.result {
            Ok(()) => info!(
                application_id = %outcome.application_id,
                channel = outcome.channel,
                "Notification sent"
            ),
            Err(e) => warn!(
                application_id = %outcome.application_id,
                channel = outcome.channel,
                "Notification failed: {e}"
            ),
        }
    }
}

/// Builds one notifier per channel. A channel without credentials, or whose
/// client cannot be constructed, degrades to `LogOnlyNotifier`.
pub fn build_notifiers(config: &Config) -> Vec<Arc<dyn Notifier>> {
    let timeout = config.timeouts.notification;

    let email: Arc<dyn Notifier> = match &config.email {
        Some(email_config) => match EmailNotifier::new(email_config, timeout) {
            Ok(notifier) => {
                info!("Email notifications enabled (to: {})", email_config.recipient);
                Arc::new(notifier)
            }
            Err(e) => {
                warn!("Email notifier unavailable, falling back to log-only: {e}");
                Arc::new(LogOnlyNotifier::new(email::CHANNEL))
            }
        },
        None => {
            warn!("SMTP credentials not set; email notifications are log-only");
            Arc::new(LogOnlyNotifier::new(email::CHANNEL))
        }
    };

    let messaging: Arc<dyn Notifier> = match &config.messaging {
        Some(messaging_config) => match MessagingNotifier::new(messaging_config, timeout) {
            Ok(notifier) => {
                info!("Messaging notifications enabled (to: {})", messaging_config.to);
                Arc::new(notifier)
            }
            Err(e) => {
                warn!("Messaging notifier unavailable, falling back to log-only: {e}");
                Arc::new(LogOnlyNotifier::new(messaging::CHANNEL))
            }
        },
        None => {
            warn!("Twilio credentials not set; messaging notifications are log-only");
            Arc::new(LogOnlyNotifier::new(messaging::CHANNEL))
        }
    };

    vec![email, messaging]
}
