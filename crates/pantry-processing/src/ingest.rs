//! Bulk file schema validation.
//!
//! The producer runs `validate_*` over the fully buffered upload before staging it.
//! The consumer re-parses staged files with `parse_*`, which applies only the
//! structural rules (strict CSV shape, JSON array of objects).

use pantry_core::constants::REQUIRED_FIELDS;
use pantry_core::FieldMap;

/// Errors raised while checking a bulk file against the grocery contract.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no records found in CSV data")]
    NoHeaderRow,

    #[error("CSV file contains an empty header field")]
    EmptyHeader,

    #[error("CSV file contains a header field with a space: {0}")]
    HeaderContainsSpace(String),

    #[error("CSV is missing required headers: {}", .0.join(","))]
    MissingHeaders(Vec<String>),

    #[error("failed to read CSV records: {0}")]
    MalformedCsv(String),

    #[error("failed to decode JSON: {0}")]
    MalformedJson(String),

    #[error("missing required field '{0}' in one or more grocery items")]
    MissingField(String),
}

/// A parsed CSV file: the header row and every data row.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse CSV bytes strictly. The first row is the header row.
pub fn parse_csv(bytes: &[u8]) -> Result<CsvTable, SchemaError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(bytes);

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        None => return Err(SchemaError::NoHeaderRow),
        Some(record) => record
            .map_err(|e| SchemaError::MalformedCsv(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect(),
    };

    let rows = records
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .map_err(|e| SchemaError::MalformedCsv(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CsvTable { headers, rows })
}

/// Parse CSV bytes and enforce the header contract.
pub fn validate_csv(bytes: &[u8]) -> Result<CsvTable, SchemaError> {
    let table = parse_csv(bytes)?;
    check_headers(&table.headers)?;
    Ok(table)
}

fn check_headers(headers: &[String]) -> Result<(), SchemaError> {
    for header in headers {
        if header.trim().is_empty() {
            return Err(SchemaError::EmptyHeader);
        }
        if header.contains(' ') {
            return Err(SchemaError::HeaderContainsSpace(header.clone()));
        }
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingHeaders(missing))
    }
}

/// Parse JSON bytes as an array of objects.
pub fn parse_json(bytes: &[u8]) -> Result<Vec<FieldMap>, SchemaError> {
    serde_json::from_slice::<Vec<FieldMap>>(bytes)
        .map_err(|e| SchemaError::MalformedJson(e.to_string()))
}

/// Parse JSON bytes and require every grocery field on every record.
///
/// Only presence is checked; values are not inspected.
pub fn validate_json(bytes: &[u8]) -> Result<Vec<FieldMap>, SchemaError> {
    let items = parse_json(bytes)?;

    for item in &items {
        if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !item.contains_key(**f)) {
            return Err(SchemaError::MissingField(field.to_string()));
        }
    }

    Ok(items)
}
