//! Shared fakes and helpers for the intake integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;

use intake::config::Config;
use intake::db::{ApplicationStore, PersistenceError};
use intake::models::application::ApplicationRecord;
use intake::notify::{
    ApplicationNotice, NotificationDispatcher, NotificationError, NotificationOutcome, Notifier,
};
use intake::storage::{CvStorage, StorageError, UploadedCv};
use intake::{build_router, AppState};

pub const BOUNDARY: &str = "----intake-test-boundary";

// =============================================================================
// Data store fakes
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<Vec<ApplicationRecord>>,
}

impl MemoryStore {
    pub fn records(&self) -> Vec<ApplicationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), PersistenceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct UnavailableStore;

#[async_trait]
impl ApplicationStore for UnavailableStore {
    async fn insert(&self, _: &ApplicationRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Database(sqlx::Error::PoolTimedOut))
    }
}

// =============================================================================
// Storage fakes
// =============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn address(key: &str) -> String {
        format!("memory://{key}")
    }

    pub fn object_at(&self, address: &str) -> Option<Bytes> {
        let key = address.strip_prefix("memory://")?;
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl CvStorage for MemoryStorage {
    async fn put(&self, key: &str, cv: &UploadedCv) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), cv.bytes.clone());
        Ok(Self::address(key))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub struct RejectingStorage;

#[async_trait]
impl CvStorage for RejectingStorage {
    async fn put(&self, _: &str, _: &UploadedCv) -> Result<String, StorageError> {
        Err(StorageError::Remote("bucket is read-only".into()))
    }

    fn backend(&self) -> &'static str {
        "rejecting"
    }
}

pub struct HangingStorage;

#[async_trait]
impl CvStorage for HangingStorage {
    async fn put(&self, _: &str, _: &UploadedCv) -> Result<String, StorageError> {
        std::future::pending::<()>().await;
        unreachable!()
    }

    fn backend(&self) -> &'static str {
        "hanging"
    }
}

// =============================================================================
// Notifier fakes
// =============================================================================

pub struct RecordingNotifier {
    pub channel: &'static str,
    pub notices: Arc<Mutex<Vec<ApplicationNotice>>>,
}

impl RecordingNotifier {
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            notices: Arc::default(),
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &ApplicationNotice) -> Result<(), NotificationError> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }

    fn channel(&self) -> &'static str {
        self.channel
    }
}

pub struct FailingNotifier(pub &'static str);

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _: &ApplicationNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Api {
            status: 503,
            message: format!("{} provider unavailable", self.0),
        })
    }

    fn channel(&self) -> &'static str {
        self.0
    }
}

// =============================================================================
// App assembly
// =============================================================================

pub struct TestApp {
    pub router: Router,
    pub outcomes: mpsc::UnboundedReceiver<NotificationOutcome>,
}

pub fn build_app(
    config: Config,
    storage: Arc<dyn CvStorage>,
    store: Arc<dyn ApplicationStore>,
    notifiers: Vec<Arc<dyn Notifier>>,
) -> TestApp {
    let (notifications, outcomes) =
        NotificationDispatcher::new(notifiers, config.timeouts.notification);
    let state = AppState {
        config: Arc::new(config),
        storage,
        store,
        notifications,
    };
    TestApp {
        router: build_router(state),
        outcomes,
    }
}

/// Waits for `n` notification outcomes.
pub async fn collect_outcomes(
    rx: &mut mpsc::UnboundedReceiver<NotificationOutcome>,
    n: usize,
) -> Vec<NotificationOutcome> {
    let mut outcomes = Vec::with_capacity(n);
    for _ in 0..n {
        let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("notification outcome within 5s")
            .expect("dispatcher alive");
        outcomes.push(outcome);
    }
    outcomes
}

// =============================================================================
// Request helpers
// =============================================================================

/// Hand-built multipart/form-data body.
pub fn multipart_body(fields: &[(&str, &str)], cv: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = cv {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cv\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn apply_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/apply")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn applicant_fields<'a>(
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    position: &'a str,
) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", name),
        ("email", email),
        ("phone", phone),
        ("position", position),
    ]
}

pub fn jane_request() -> Request<Body> {
    apply_request(multipart_body(
        &applicant_fields("Jane Doe", "jane@x.com", "555-1234", "Engineer"),
        Some(("jane.pdf", b"%PDF-1.4 jane")),
    ))
}

pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
