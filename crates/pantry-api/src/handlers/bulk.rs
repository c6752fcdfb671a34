use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pantry_core::AppError;
use serde_json::json;

use crate::error::HttpAppError;
use crate::services::bulk_producer::{submit_bulk_file, BulkUpload};
use crate::state::AppState;

/// Read the `file` part of a bulk upload form.
async fn read_bulk_file(mut multipart: Multipart) -> Result<BulkUpload, HttpAppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(BulkUpload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    Err(AppError::BadRequest("Please provide a file".to_string()).into())
}

/// Stage a CSV or JSON catalog file and announce it to the bulk consumer.
#[tracing::instrument(skip(state, multipart), fields(operation = "bulk_create"))]
pub async fn bulk_create(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = read_bulk_file(multipart?).await?;
    let artifact = submit_bulk_file(&state, upload).await?;

    tracing::info!(
        url = %artifact.url,
        content_kind = %artifact.content_kind,
        size_bytes = artifact.size_bytes,
        "Bulk file accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File URL sent successfully",
            "url": artifact.url,
        })),
    ))
}
