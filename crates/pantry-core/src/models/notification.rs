use serde::{Deserialize, Serialize};

use crate::constants::{
    AUDIT_SUBSCRIPTION, AUDIT_TOPIC, BULK_CREATE_SUBSCRIPTION, BULK_CREATE_TOPIC,
    THUMBNAIL_SUBSCRIPTION, THUMBNAIL_TOPIC,
};
use crate::models::{AuditRecord, BulkFilePayload};

/// Payload asking for a thumbnail of a catalog item's image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThumbnailPayload {
    #[serde(rename = "fileURL")]
    pub file_url: String,
    #[serde(rename = "ID")]
    pub id: i64,
}

/// A message plus the topic/subscription/endpoint triple it is published through.
///
/// Publishing provisions the topic and subscription before sending, so the event
/// carries everything needed to create them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub topic: String,
    pub subscription_name: String,
    pub push_endpoint: String,
    pub payload: serde_json::Value,
}

impl NotificationEvent {
    pub fn new(
        topic: impl Into<String>,
        subscription_name: impl Into<String>,
        push_endpoint: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            topic: topic.into(),
            subscription_name: subscription_name.into(),
            push_endpoint: push_endpoint.into(),
            payload,
        }
    }

    /// Bulk file staged and ready for the consumer.
    pub fn bulk_file_ready(file_url: &str, push_endpoint: impl Into<String>) -> Self {
        let payload = BulkFilePayload {
            file_url: file_url.to_string(),
        };
        Self::new(
            BULK_CREATE_TOPIC,
            BULK_CREATE_SUBSCRIPTION,
            push_endpoint,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Original image staged for catalog item `id`.
    pub fn thumbnail_requested(file_url: &str, id: i64, push_endpoint: impl Into<String>) -> Self {
        let payload = ThumbnailPayload {
            file_url: file_url.to_string(),
            id,
        };
        Self::new(
            THUMBNAIL_TOPIC,
            THUMBNAIL_SUBSCRIPTION,
            push_endpoint,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    pub fn audit(record: &AuditRecord, push_endpoint: impl Into<String>) -> Self {
        Self::new(
            AUDIT_TOPIC,
            AUDIT_SUBSCRIPTION,
            push_endpoint,
            serde_json::to_value(record).unwrap_or_default(),
        )
    }
}
