use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intake::config::Config;
use intake::db::{create_pool, run_migrations, PgApplicationStore};
use intake::notify::{build_notifiers, log_outcomes, NotificationDispatcher};
use intake::storage::build_storage;
use intake::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize CV storage
    let storage = build_storage(&config.storage).await;
    info!("CV storage backend: {}", storage.backend());

    // Initialize notifications; outcomes are only ever logged
    let (notifications, outcomes) =
        NotificationDispatcher::new(build_notifiers(&config), config.timeouts.notification);
    tokio::spawn(log_outcomes(outcomes));
    info!("Notification channels: {:?}", notifications.channels());

    let cors = build_cors(&config.frontend_url)?;

    // Build app state
    let state = AppState {
        config: Arc::new(config.clone()),
        storage,
        store: Arc::new(PgApplicationStore::new(db)),
        notifications,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Allows the configured frontend origin, with credentials.
fn build_cors(frontend_url: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = frontend_url
        .parse()
        .with_context(|| format!("FRONTEND_URL '{frontend_url}' is not a valid origin"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
