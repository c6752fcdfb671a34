//! Thumbnail consumer: fetch the original, resize, encode, stage and record the URL.

use chrono::Utc;
use pantry_core::constants::{GROCERIES_COLLECTION, THUMBNAIL_JPEG_QUALITY};
use pantry_core::{AppError, FieldMap, ThumbnailPayload};
use pantry_processing::{encode_jpeg, resize_to_thumbnail};
use pantry_storage::keys::thumbnail_key;
use serde_json::Value;
use std::time::Instant;

use crate::error::{db_error, storage_error, thumbnail_error};
use crate::state::AppState;

/// A staged thumbnail.
#[derive(Debug, Clone)]
pub struct ThumbnailOutput {
    pub key: String,
    pub url: String,
    pub bytes: Vec<u8>,
}

pub fn decode_payload(payload: &Value) -> Result<ThumbnailPayload, AppError> {
    serde_json::from_value(payload.clone())
        .map_err(|_| AppError::BadRequest("Failed to decode message".to_string()))
}

pub fn decode_body(body: &[u8]) -> Result<ThumbnailPayload, AppError> {
    serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Failed to decode message".to_string()))
}

fn stage_failed(stage: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| {
        tracing::error!(stage = stage, error = %err, "Thumbnail generation failed");
        err
    }
}

/// Generate the thumbnail for one catalog item and merge `thumbnailURL` into it.
#[tracing::instrument(skip(state, payload), fields(doc_id = payload.id, url = %payload.file_url))]
pub async fn generate_thumbnail(
    state: &AppState,
    payload: &ThumbnailPayload,
) -> Result<ThumbnailOutput, AppError> {
    let start = Instant::now();
    tracing::info!("Thumbnail generation started");

    let original = state
        .fetcher
        .fetch(&payload.file_url)
        .await
        .map_err(|e| AppError::UpstreamFetch(e.to_string()))
        .map_err(stage_failed("fetch"))?;
    let original_size = original.len();

    let resized = tokio::task::spawn_blocking(move || resize_to_thumbnail(&original))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to process image: {}", e)))
        .map_err(stage_failed("resize"))?
        .map_err(thumbnail_error)
        .map_err(stage_failed("resize"))?;
    tracing::info!(
        size_bytes = original_size,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Original fetched and resized"
    );

    let bytes = tokio::task::spawn_blocking(move || encode_jpeg(&resized, THUMBNAIL_JPEG_QUALITY))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to process image: {}", e)))
        .map_err(stage_failed("encode"))?
        .map_err(thumbnail_error)
        .map_err(stage_failed("encode"))?;
    tracing::info!(size_bytes = bytes.len(), "Thumbnail encoded");

    let key = thumbnail_key(payload.id, Utc::now());
    let url = state
        .storage
        .put(&key, bytes.clone(), "image/jpeg")
        .await
        .map_err(storage_error)
        .map_err(stage_failed("store"))?;
    state
        .storage
        .set_public_read(&key)
        .await
        .map_err(storage_error)
        .map_err(stage_failed("store"))?;
    tracing::info!(key = %key, url = %url, "Thumbnail stored");

    let mut update = FieldMap::new();
    update.insert("thumbnailURL".to_string(), Value::String(url.clone()));
    state
        .records
        .merge(GROCERIES_COLLECTION, &payload.id.to_string(), update)
        .await
        .map_err(db_error)
        .map_err(stage_failed("catalog_write"))?;
    tracing::info!(
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Catalog document updated with thumbnail"
    );

    Ok(ThumbnailOutput { key, url, bytes })
}
