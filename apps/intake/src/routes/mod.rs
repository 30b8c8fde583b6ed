pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::careers;
use crate::intake::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/apply",
            post(handlers::handle_apply).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/jobs", get(careers::handle_search_jobs))
        .with_state(state)
}
