use pantry_core::constants::{AUDIT_CONSUMER_PATH, AUDIT_LOG_COLLECTION};
use pantry_core::{AppError, AuditAction, AuditRecord, FieldMap, NotificationEvent};
use serde_json::Value;

use crate::error::{channel_error, db_error};
use crate::state::AppState;

pub fn decode_payload(payload: &Value) -> Result<FieldMap, AppError> {
    match payload {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(AppError::BadRequest("Failed to decode message".to_string())),
    }
}

pub fn decode_body(body: &[u8]) -> Result<FieldMap, AppError> {
    serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Failed to decode message".to_string()))
}

/// Publish an audit record for a catalog change.
pub async fn publish_audit(
    state: &AppState,
    action: AuditAction,
    id: &str,
    product_name: &str,
) -> Result<AuditRecord, AppError> {
    let record = AuditRecord::now(action, id, product_name);
    let event = NotificationEvent::audit(&record, state.config.push_endpoint(AUDIT_CONSUMER_PATH));
    state
        .channel
        .publish_event(&event)
        .await
        .map_err(channel_error)?;
    tracing::info!(action = %action, doc_id = %id, "Audit record published");
    Ok(record)
}

/// Append a delivered audit record to `Audit_Logs`. Returns the new key.
#[tracing::instrument(skip(state, record))]
pub async fn append_audit_record(state: &AppState, record: FieldMap) -> Result<String, AppError> {
    let key = state
        .records
        .add(AUDIT_LOG_COLLECTION, record)
        .await
        .map_err(db_error)?;
    tracing::info!(doc_id = %key, "Audit log added");
    Ok(key)
}
