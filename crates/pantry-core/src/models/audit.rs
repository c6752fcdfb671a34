use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::AUDIT_TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    Update,
    Delete,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuditAction::Update => write!(f, "Update"),
            AuditAction::Delete => write!(f, "Delete"),
        }
    }
}

/// One catalog mutation, as published to the audit topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub action: AuditAction,
    pub id: String,
    pub product_name: String,
    pub timestamp: String,
}

impl AuditRecord {
    /// Builds a record stamped with the current local time.
    pub fn now(action: AuditAction, id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            action,
            id: id.into(),
            product_name: product_name.into(),
            timestamp: Local::now().format(AUDIT_TIMESTAMP_FORMAT).to_string(),
        }
    }
}
