use std::sync::Arc;

use crate::config::Config;
use crate::db::ApplicationStore;
use crate::notify::NotificationDispatcher;
use crate::storage::CvStorage;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable or internally synchronised; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Pluggable CV backend. Local disk or S3, chosen by `STORAGE_BACKEND`.
    pub storage: Arc<dyn CvStorage>,
    pub store: Arc<dyn ApplicationStore>,
    pub notifications: NotificationDispatcher,
}
