//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Services return
//! `Result<T, AppError>` and map crate errors with the `*_error` helpers below, so
//! every failure renders the same way: a plain-text body with the variant's status.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::QueryRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use pantry_core::{AppError, ErrorMetadata, LogLevel};
use pantry_db::DbError;
use pantry_processing::{FieldValidationError, SchemaError, ThumbnailError};
use pantry_storage::StorageError;
use pantry_worker::ChannelError;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from pantry-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = if is_production_env() && app_error.is_sensitive() {
            "Internal server error".to_string()
        } else {
            app_error.client_message()
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

// Convert domain errors to AppError (services) and HttpAppError (handlers)

pub fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::Transport(msg) => AppError::UpstreamFetch(msg),
        StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
        StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
        other => AppError::Storage(other.to_string()),
    }
}

pub fn db_error(err: DbError) -> AppError {
    match err {
        DbError::NotFound { .. } => AppError::NotFound("Document not found".to_string()),
        other => AppError::Database(other.to_string()),
    }
}

pub fn channel_error(err: ChannelError) -> AppError {
    AppError::Channel(format!("Failed to publish to notification channel: {}", err))
}

pub fn schema_error(err: SchemaError) -> AppError {
    AppError::InvalidInput(err.to_string())
}

pub fn field_error(err: FieldValidationError) -> AppError {
    AppError::InvalidInput(err.to_string())
}

pub fn thumbnail_error(err: ThumbnailError) -> AppError {
    AppError::ImageProcessing(err.to_string())
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error(err))
    }
}

impl From<DbError> for HttpAppError {
    fn from(err: DbError) -> Self {
        HttpAppError(db_error(err))
    }
}

impl From<ChannelError> for HttpAppError {
    fn from(err: ChannelError) -> Self {
        HttpAppError(channel_error(err))
    }
}

impl From<SchemaError> for HttpAppError {
    fn from(err: SchemaError) -> Self {
        HttpAppError(schema_error(err))
    }
}

impl From<FieldValidationError> for HttpAppError {
    fn from(err: FieldValidationError) -> Self {
        HttpAppError(field_error(err))
    }
}

impl From<ThumbnailError> for HttpAppError {
    fn from(err: ThumbnailError) -> Self {
        HttpAppError(thumbnail_error(err))
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Multipart rejected");
        HttpAppError(AppError::BadRequest(
            "Failed to parse multipart form".to_string(),
        ))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpAppError(AppError::PayloadTooLarge(
                "Request body exceeds the upload size limit".to_string(),
            ))
        } else {
            tracing::debug!(error = %err.body_text(), "Multipart field could not be read");
            HttpAppError(AppError::BadRequest(
                "Failed to parse multipart form".to_string(),
            ))
        }
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid query parameters: {}",
            rejection.body_text()
        )))
    }
}
