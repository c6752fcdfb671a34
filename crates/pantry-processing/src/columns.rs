//! Per-record column rules applied by the bulk consumer.

use pantry_core::{FieldMap, PricePolicy};
use serde_json::{Number, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("non-numeric value in 'price' column: {0}")]
    NonNumericPrice(String),
}

/// Pair a CSV row with its headers. Values stay strings.
pub fn csv_record(headers: &[String], row: &[String]) -> FieldMap {
    headers
        .iter()
        .zip(row)
        .map(|(header, value)| (header.clone(), Value::String(value.clone())))
        .collect()
}

/// Check the `price` column of one record and rewrite it according to `policy`.
///
/// A record without a `price` field passes through untouched.
pub fn apply_column_policy(mut record: FieldMap, policy: PricePolicy) -> Result<FieldMap, ColumnError> {
    let Some(raw) = record.get("price") else {
        return Ok(record);
    };

    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };

    let price = parsed.ok_or_else(|| ColumnError::NonNumericPrice(display_value(raw)))?;

    if policy == PricePolicy::Normalize {
        let number = Number::from_f64(price)
            .ok_or_else(|| ColumnError::NonNumericPrice(display_value(raw)))?;
        record.insert("price".to_string(), Value::Number(number));
    }

    Ok(record)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
