use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::application::ApplicationRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record write timed out after {0:?}")]
    Timeout(Duration),
}

/// The data-store seam of the intake workflow: insert one record or fail.
/// Records are append-only: there is no update or delete.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), PersistenceError>;
}

/// Postgres-backed application store.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (id, name, email, phone, position, cv_location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.position)
        .bind(&record.cv_location)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        info!("Inserted application {}", record.id);
        Ok(())
    }
}

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
