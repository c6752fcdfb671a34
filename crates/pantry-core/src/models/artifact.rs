use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Kind of content carried by a staged artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Csv,
    Json,
    Image,
}

impl ContentKind {
    /// Maps a declared upload content type onto a bulk content kind.
    ///
    /// Only `text/csv` and `application/json` are bulk kinds; parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn from_bulk_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "text/csv" => Some(ContentKind::Csv),
            "application/json" => Some(ContentKind::Json),
            _ => None,
        }
    }

    /// Consumer-side dispatch: a `.csv` suffix selects CSV, anything else JSON.
    pub fn from_staged_url(url: &str) -> Self {
        if url.to_lowercase().ends_with(".csv") {
            ContentKind::Csv
        } else {
            ContentKind::Json
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::Csv => "text/csv",
            ContentKind::Json => "application/json",
            ContentKind::Image => "image/jpeg",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContentKind::Csv => write!(f, "csv"),
            ContentKind::Json => write!(f, "json"),
            ContentKind::Image => write!(f, "image"),
        }
    }
}

/// A file written to the artifact store and granted public read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedArtifact {
    pub url: String,
    pub key: String,
    pub content_kind: ContentKind,
    pub size_bytes: u64,
}
