//! Application setup and initialization
//!
//! Builds the process-wide clients, wires in-process delivery back to the
//! application state and assembles the router.

pub mod channel;
pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use pantry_core::Config;
use pantry_worker::PushHandlerContext;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let state = build_state(config.clone()).await?;
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}

/// Create the stores and the channel, then bind in-process delivery to the new state.
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let (records, pool) = database::setup_record_store(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let (channel, context_target) = channel::setup_channel(&config)?;

    let state = Arc::new(AppState::new(config, storage, records, channel, pool)?);

    if let Some(target) = context_target {
        let ctx: Arc<dyn PushHandlerContext> = state.clone();
        target.bind(Arc::downgrade(&ctx));
        tracing::info!("In-process delivery bound to application state");
    }

    Ok(state)
}
