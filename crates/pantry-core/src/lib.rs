//! Pantry Core Library
//!
//! This crate provides the domain models, error types, configuration and shared
//! constants used by every Pantry component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AppConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AuditAction, AuditRecord, BulkFilePayload, ContentKind, FieldMap, JsonFailurePolicy,
    NotificationEvent, PricePolicy, ThumbnailPayload, UploadedArtifact,
};
pub use storage_types::{DeliveryMode, RecordStoreBackend, StorageBackend};
