use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A document body: field name to JSON value.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Payload announcing that a bulk file has been staged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkFilePayload {
    #[serde(rename = "fileURL")]
    pub file_url: String,
}

/// What the JSON bulk path does when one record fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JsonFailurePolicy {
    /// Stop at the first failing record and fail the whole invocation.
    #[default]
    Abort,
    /// Skip the failing record and keep going, like the CSV path.
    Isolate,
}

impl FromStr for JsonFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(JsonFailurePolicy::Abort),
            "isolate" => Ok(JsonFailurePolicy::Isolate),
            _ => Err(anyhow::anyhow!("Invalid JSON failure policy: {}", s)),
        }
    }
}

impl Display for JsonFailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JsonFailurePolicy::Abort => write!(f, "abort"),
            JsonFailurePolicy::Isolate => write!(f, "isolate"),
        }
    }
}

/// How a validated `price` value is written to the record store.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PricePolicy {
    /// Keep the value exactly as it appeared in the file.
    #[default]
    Preserve,
    /// Store the parsed floating-point number.
    Normalize,
}

impl FromStr for PricePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preserve" => Ok(PricePolicy::Preserve),
            "normalize" => Ok(PricePolicy::Normalize),
            _ => Err(anyhow::anyhow!("Invalid price policy: {}", s)),
        }
    }
}

impl Display for PricePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PricePolicy::Preserve => write!(f, "preserve"),
            PricePolicy::Normalize => write!(f, "normalize"),
        }
    }
}
