//! Record store setup

use anyhow::{Context, Result};
use pantry_core::{Config, RecordStoreBackend};
use pantry_db::{MemoryRecordStore, PgRecordStore, RecordStore};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Create the configured record store. The pool is returned for the PostgreSQL backend.
pub async fn setup_record_store(
    config: &Config,
) -> Result<(Arc<dyn RecordStore>, Option<PgPool>)> {
    match config.record_store_backend() {
        RecordStoreBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Ok((Arc::new(MemoryRecordStore::new()), None))
        }
        RecordStoreBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok((Arc::new(PgRecordStore::new(pool.clone())), Some(pool)))
        }
    }
}

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url()
        .context("DATABASE_URL must be set when using the postgres record store")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Path: workspace migrations/ from crate root
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
