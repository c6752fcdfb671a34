use chrono::Utc;
use pantry_core::constants::BULK_CONSUMER_PATH;
use pantry_core::{AppError, ContentKind, NotificationEvent, UploadedArtifact};
use pantry_processing::{validate_csv, validate_json};
use pantry_storage::keys::bulk_key;

use crate::error::{channel_error, schema_error, storage_error};
use crate::state::AppState;

/// A bulk file as received from the client.
#[derive(Debug, Clone)]
pub struct BulkUpload {
    pub filename: String,
    /// Declared by the client on the multipart part.
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Validate, stage and announce a bulk file.
///
/// Nothing is staged when validation fails, and nothing is published when staging
/// fails. A publish failure leaves the staged artifact in place.
#[tracing::instrument(
    skip(state, upload),
    fields(
        filename = %upload.filename,
        content_type = %upload.content_type,
        size_bytes = upload.data.len()
    )
)]
pub async fn submit_bulk_file(
    state: &AppState,
    upload: BulkUpload,
) -> Result<UploadedArtifact, AppError> {
    let kind = ContentKind::from_bulk_content_type(&upload.content_type)
        .filter(|kind| *kind != ContentKind::Image)
        .ok_or_else(|| {
            AppError::InvalidInput(
                "Unsupported file type. Only CSV or JSON files are allowed".to_string(),
            )
        })?;

    let record_count = match kind {
        ContentKind::Csv => validate_csv(&upload.data).map_err(schema_error)?.rows.len(),
        _ => validate_json(&upload.data).map_err(schema_error)?.len(),
    };
    tracing::info!(records = record_count, kind = %kind, "Bulk file validated");

    let key = bulk_key(&upload.filename, Utc::now());
    let size_bytes = upload.data.len() as u64;

    let url = state
        .storage
        .put(&key, upload.data, kind.mime_type())
        .await
        .map_err(storage_error)?;
    state
        .storage
        .set_public_read(&key)
        .await
        .map_err(storage_error)?;
    tracing::info!(key = %key, url = %url, "Bulk file staged");

    let event = NotificationEvent::bulk_file_ready(
        &url,
        state.config.push_endpoint(BULK_CONSUMER_PATH),
    );
    state
        .channel
        .publish_event(&event)
        .await
        .map_err(channel_error)?;

    Ok(UploadedArtifact {
        url,
        key,
        content_kind: kind,
        size_bytes,
    })
}
