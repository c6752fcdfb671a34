use anyhow::{anyhow, Context};
use pantry_core::constants::BULK_DATA_COLLECTION;
use pantry_core::{
    AppError, BulkFilePayload, ContentKind, FieldMap, JsonFailurePolicy, PricePolicy,
};
use pantry_db::RecordStore;
use pantry_processing::{apply_column_policy, csv_record, parse_csv, parse_json};
use pantry_worker::{run_bounded, PoolReport, UnitOutcome};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

pub const CSV_FAILURE_MESSAGE: &str = "failed to fetch and upload CSV to Firestore";
pub const JSON_FAILURE_MESSAGE: &str = "failed to fetch and upload JSON to Firestore";

pub fn decode_payload(payload: &Value) -> Result<BulkFilePayload, AppError> {
    serde_json::from_value(payload.clone())
        .map_err(|_| AppError::BadRequest("Failed to decode message".to_string()))
}

pub fn decode_body(body: &[u8]) -> Result<BulkFilePayload, AppError> {
    serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Failed to decode message".to_string()))
}

/// Fetch a staged bulk file and write each of its records to `bulk_data`.
///
/// The URL suffix picks the parser: `.csv` for CSV, anything else JSON. Failing
/// records are dropped on the CSV path; the JSON path follows the configured
/// failure policy. The whole invocation fails only when the file cannot be read.
#[tracing::instrument(skip(state, payload), fields(url = %payload.file_url))]
pub async fn consume_bulk_file(
    state: &AppState,
    payload: &BulkFilePayload,
) -> Result<PoolReport, AppError> {
    let start = Instant::now();
    let kind = ContentKind::from_staged_url(&payload.file_url);

    let result = match kind {
        ContentKind::Csv => consume_csv(state, &payload.file_url).await,
        _ => consume_json(state, &payload.file_url).await,
    };

    match result {
        Ok(report) => {
            tracing::info!(
                kind = %kind,
                persisted = report.persisted,
                skipped = report.skipped,
                failed = report.failed,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Bulk file consumed"
            );
            Ok(report)
        }
        Err(source) => {
            let message = match kind {
                ContentKind::Csv => CSV_FAILURE_MESSAGE,
                _ => JSON_FAILURE_MESSAGE,
            };
            Err(AppError::PipelineFailed {
                message: message.to_string(),
                source,
            })
        }
    }
}

async fn consume_csv(state: &AppState, url: &str) -> anyhow::Result<PoolReport> {
    let data = state
        .fetcher
        .fetch(url)
        .await
        .context("failed to fetch CSV file")?;
    let table = parse_csv(&data)?;
    tracing::debug!(rows = table.rows.len(), "CSV parsed");

    let headers = Arc::new(table.headers);
    let records = state.records.clone();
    let policy = state.config.bulk_price_policy();

    let report = run_bounded(
        state.config.bulk_consumer_concurrency(),
        table.rows,
        move |row: Vec<String>| {
            let headers = headers.clone();
            let records = records.clone();
            async move {
                let mapping = csv_record(&headers, &row);
                persist_record(records.as_ref(), mapping, policy).await
            }
        },
    )
    .await;

    Ok(report)
}

async fn consume_json(state: &AppState, url: &str) -> anyhow::Result<PoolReport> {
    let data = state
        .fetcher
        .fetch(url)
        .await
        .context("failed to fetch JSON file")?;
    let items = parse_json(&data)?;
    tracing::debug!(records = items.len(), "JSON parsed");

    let policy = state.config.bulk_price_policy();
    let failure_policy = state.config.bulk_json_failure_policy();
    let mut report = PoolReport::default();

    for (index, item) in items.into_iter().enumerate() {
        match persist_record(state.records.as_ref(), item, policy).await {
            UnitOutcome::Persisted => report.persisted += 1,
            UnitOutcome::Skipped(reason) | UnitOutcome::Failed(reason)
                if failure_policy == JsonFailurePolicy::Abort =>
            {
                return Err(anyhow!(
                    "record {} failed after {} persisted: {}",
                    index,
                    report.persisted,
                    reason
                ));
            }
            UnitOutcome::Skipped(_) => report.skipped += 1,
            UnitOutcome::Failed(_) => report.failed += 1,
        }
    }

    Ok(report)
}

async fn persist_record(
    records: &dyn RecordStore,
    mapping: FieldMap,
    policy: PricePolicy,
) -> UnitOutcome {
    let mapping = match apply_column_policy(mapping, policy) {
        Ok(mapping) => mapping,
        Err(e) => {
            tracing::warn!(error = %e, "Bulk record skipped");
            return UnitOutcome::Skipped(e.to_string());
        }
    };

    match records.add(BULK_DATA_COLLECTION, mapping).await {
        Ok(key) => {
            tracing::debug!(doc_id = %key, "Bulk record persisted");
            UnitOutcome::Persisted
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist bulk record");
            UnitOutcome::Failed(e.to_string())
        }
    }
}
