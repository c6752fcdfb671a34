//! Storage setup and initialization

use anyhow::Result;
use pantry_core::Config;
use pantry_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing artifact store...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Artifact store initialized successfully"
    );
    Ok(storage)
}
