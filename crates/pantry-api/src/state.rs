//! Application state shared by handlers and in-process consumers.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pantry_core::constants::{AUDIT_CONSUMER_PATH, BULK_CONSUMER_PATH, THUMBNAIL_CONSUMER_PATH};
use pantry_core::Config;
use pantry_db::RecordStore;
use pantry_storage::{ArtifactFetcher, Storage};
use pantry_worker::{endpoint_path, NotificationChannel, PushHandlerContext};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::services::{audit, bulk_consumer, thumbnail};

/// Process-wide clients, created once at startup.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub records: Arc<dyn RecordStore>,
    pub channel: Arc<dyn NotificationChannel>,
    pub fetcher: ArtifactFetcher,
    /// Present when the record store is PostgreSQL; closed on shutdown.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        records: Arc<dyn RecordStore>,
        channel: Arc<dyn NotificationChannel>,
        pool: Option<PgPool>,
    ) -> Result<Self> {
        let fetcher = ArtifactFetcher::new(
            storage.clone(),
            Duration::from_secs(config.http_fetch_timeout_secs()),
        )?;

        Ok(Self {
            config,
            storage,
            records,
            channel,
            fetcher,
            pool,
        })
    }
}

/// In-process delivery: route a pushed message to the consumer behind its endpoint.
#[async_trait]
impl PushHandlerContext for AppState {
    async fn dispatch(self: Arc<Self>, endpoint: &str, payload: &Value) -> Result<()> {
        match endpoint_path(endpoint) {
            BULK_CONSUMER_PATH => {
                let payload = bulk_consumer::decode_payload(payload)?;
                bulk_consumer::consume_bulk_file(&self, &payload).await?;
            }
            THUMBNAIL_CONSUMER_PATH => {
                let payload = thumbnail::decode_payload(payload)?;
                thumbnail::generate_thumbnail(&self, &payload).await?;
            }
            AUDIT_CONSUMER_PATH => {
                let record = audit::decode_payload(payload)?;
                audit::append_audit_record(&self, record).await?;
            }
            other => return Err(anyhow!("no consumer registered for {}", other)),
        }
        Ok(())
    }
}
