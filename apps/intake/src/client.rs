//! Submission client for `POST /api/apply`.
//!
//! Collects the four text fields and one CV file, validates them locally
//! (advisory only; the server does not repeat these checks), and sends a single
//! multipart request. A successful submission clears the form; a failed one
//! leaves it untouched so the user can retry. While a request is in flight the
//! client refuses to start another.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    InFlight,

    #[error("invalid form: {0}")]
    Invalid(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("submission rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CvFile {
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("cv.pdf")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    fn mime_type(&self) -> &'static str {
        if self.file_name.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub cv: Option<CvFile>,
}

impl ApplicationForm {
    /// Client-side checks: every field present, a plausible email, a non-empty CV.
    pub fn validate(&self) -> Result<(), SubmitError> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("position", &self.position),
        ] {
            if value.trim().is_empty() {
                return Err(SubmitError::Invalid(format!("{field} is required")));
            }
        }
        if !looks_like_email(self.email.trim()) {
            return Err(SubmitError::Invalid(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        match &self.cv {
            Some(cv) if !cv.bytes.is_empty() => Ok(()),
            Some(_) => Err(SubmitError::Invalid("CV file is empty".to_string())),
            None => Err(SubmitError::Invalid("CV file is required".to_string())),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_multipart(&self) -> Result<Form, SubmitError> {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("email", self.email.clone())
            .text("phone", self.phone.clone())
            .text("position", self.position.clone());
        if let Some(cv) = &self.cv {
            let part = Part::bytes(cv.bytes.clone())
                .file_name(cv.file_name.clone())
                .mime_str(cv.mime_type())?;
            form = form.part("cv", part);
        }
        Ok(form)
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// What the server said about an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub message: String,
    #[serde(default)]
    pub cv_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Resets the in-flight flag however `submit` exits.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SubmissionClient {
    http: Client,
    endpoint: String,
    in_flight: AtomicBool,
}

impl SubmissionClient {
    /// `base_url` is the intake server root, e.g. `http://localhost:5002`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SubmitError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/api/apply", base_url.trim_end_matches('/')),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(&self, form: &mut ApplicationForm) -> Result<SubmitReceipt, SubmitError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SubmitError::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        form.validate()?;

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form.to_multipart()?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!("Submission rejected with {status}: {message}");
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // Older servers answer with plain text instead of JSON.
        let receipt = serde_json::from_str::<SubmitReceipt>(&body).unwrap_or(SubmitReceipt {
            message: body,
            cv_url: None,
        });
        debug!("Submission accepted: {}", receipt.message);

        form.clear();
        Ok(receipt)
    }
}
