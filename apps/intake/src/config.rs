use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_TWILIO_FROM: &str = "whatsapp:+14155238886";
const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Application configuration loaded once from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub frontend_url: String,
    pub database_url: String,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
    pub email: Option<EmailConfig>,
    pub messaging: Option<MessagingConfig>,
    pub timeouts: Timeouts,
}

/// Which backend receives uploaded CV files.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local { root: PathBuf },
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base used to build the public URL of an uploaded object.
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_password: String,
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
}

/// Deadlines applied to every external effect of a submission.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub storage: Duration,
    pub persistence: Duration,
    pub notification: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            storage: Duration::from_secs(30),
            persistence: Duration::from_secs(10),
            notification: Duration::from_secs(15),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5002,
            frontend_url: "http://localhost:3000".to_string(),
            database_url: String::new(),
            rust_log: "info".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            storage: StorageConfig::Local {
                root: PathBuf::from("uploads"),
            },
            email: None,
            messaging: None,
            timeouts: Timeouts::default(),
        }
    }
}


impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env(&lookup);
        let defaults = Config::default();
        let default_timeouts = defaults.timeouts;

        Ok(Config {
            port: env.parse("PORT", defaults.port)?,
            frontend_url: env.optional("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            database_url: env.require("DATABASE_URL")?,
            rust_log: env.optional("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: env.parse("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            storage: storage_from_env(&env)?,
            email: email_from_env(&env),
            messaging: messaging_from_env(&env),
            timeouts: Timeouts {
                storage: Duration::from_secs(
                    env.parse("STORAGE_TIMEOUT_SECS", default_timeouts.storage.as_secs())?,
                ),
                persistence: Duration::from_secs(env.parse(
                    "PERSISTENCE_TIMEOUT_SECS",
                    default_timeouts.persistence.as_secs(),
                )?),
                notification: Duration::from_secs(env.parse(
                    "NOTIFY_TIMEOUT_SECS",
                    default_timeouts.notification.as_secs(),
                )?),
            },
        })
    }
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn require(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("Required environment variable '{key}' is not set"))
    }

    /// Unset and blank values are treated the same.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
            None => Ok(default),
        }
    }
}

fn storage_from_env(env: &Env) -> Result<StorageConfig> {
    let backend = env
        .optional("STORAGE_BACKEND")
        .unwrap_or_else(|| "local".to_string());
    match backend.to_ascii_lowercase().as_str() {
        "local" => Ok(StorageConfig::Local {
            root: PathBuf::from(
                env.optional("LOCAL_STORAGE_DIR")
                    .unwrap_or_else(|| "uploads".to_string()),
            ),
        }),
        "s3" => {
            let endpoint = env.require("S3_ENDPOINT")?;
            Ok(StorageConfig::S3(S3Config {
                bucket: env.require("S3_BUCKET")?,
                region: env
                    .optional("S3_REGION")
                    .unwrap_or_else(|| "us-east-1".to_string()),
                access_key_id: env.require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: env.require("AWS_SECRET_ACCESS_KEY")?,
                public_url: env
                    .optional("S3_PUBLIC_URL")
                    .unwrap_or_else(|| endpoint.clone()),
                endpoint,
            }))
        }
        other => bail!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
    }
}

/// Email notifications need both SMTP credentials; otherwise the channel is log-only.
fn email_from_env(env: &Env) -> Option<EmailConfig> {
    let smtp_user = env.optional("SMTP_USER")?;
    let smtp_password = env.optional("SMTP_PASSWORD")?;
    Some(EmailConfig {
        smtp_host: env
            .optional("SMTP_HOST")
            .unwrap_or_else(|| "smtp.gmail.com".to_string()),
        recipient: env
            .optional("NOTIFY_EMAIL_TO")
            .unwrap_or_else(|| smtp_user.clone()),
        smtp_user,
        smtp_password,
    })
}

fn messaging_from_env(env: &Env) -> Option<MessagingConfig> {
    Some(MessagingConfig {
        account_sid: env.optional("TWILIO_ACCOUNT_SID")?,
        auth_token: env.optional("TWILIO_AUTH_TOKEN")?,
        to: env.optional("TWILIO_TO")?,
        from: env
            .optional("TWILIO_FROM")
            .unwrap_or_else(|| DEFAULT_TWILIO_FROM.to_string()),
        api_base: env
            .optional("TWILIO_API_BASE")
            .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
    })
}
