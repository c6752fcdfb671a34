//! Push targets for the notification channel.
//!
//! The channel POSTs the published payload as the request body. A 2xx response
//! acknowledges it; anything else is redelivered.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use pantry_core::AppError;

use crate::error::HttpAppError;
use crate::services::{audit, bulk_consumer, thumbnail};
use crate::state::AppState;

pub async fn download_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let payload = bulk_consumer::decode_body(&body)?;
    bulk_consumer::consume_bulk_file(&state, &payload).await?;

    Ok((
        StatusCode::OK,
        "File content fetched and uploaded to Firestore successfully",
    ))
}

/// Generate a thumbnail and return its JPEG bytes.
pub async fn thumbnail(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let payload = thumbnail::decode_body(&body)?;
    let output = thumbnail::generate_thumbnail(&state, &payload).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_LENGTH, output.bytes.len().to_string()),
        ],
        output.bytes,
    ))
}

pub async fn audit_log(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = audit::decode_body(&body)?;
    tracing::debug!(record = ?record, "Received audit record");

    audit::append_audit_record(&state, record)
        .await
        .map_err(|err| AppError::PipelineFailed {
            message: "Failed to process message".to_string(),
            source: anyhow::Error::new(err),
        })?;

    Ok((StatusCode::OK, "Audit Log Added Successfully"))
}

/// Any method other than POST on the audit endpoint.
pub async fn audit_log_method_not_allowed() -> HttpAppError {
    AppError::MethodNotAllowed("Invalid request method".to_string()).into()
}
