//! Field validators for single-item catalog writes.

use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("Price cannot be a character value. Please enter a valid value")]
    NonNumericPrice,

    #[error("Price should not be a non-negative value")]
    NegativePrice,

    #[error("ItemPackageQuantity Cannot be Character value, Please Enter Valid value")]
    NonNumericQuantity,

    #[error("ItemPackageQuantity Should Not be a non-negative value")]
    NegativeQuantity,
}

/// Parse a price. It must be a number and not below zero.
pub fn validate_price(raw: &str) -> Result<f64, FieldValidationError> {
    let price = raw
        .parse::<f64>()
        .map_err(|_| FieldValidationError::NonNumericPrice)?;
    if price.is_nan() {
        return Err(FieldValidationError::NonNumericPrice);
    }
    if price < 0.0 {
        return Err(FieldValidationError::NegativePrice);
    }
    Ok(price)
}

/// Parse an item package quantity. It must be an integer and not below zero.
pub fn validate_item_package_quantity(raw: &str) -> Result<i64, FieldValidationError> {
    let quantity = raw
        .parse::<i64>()
        .map_err(|_| FieldValidationError::NonNumericQuantity)?;
    if quantity < 0 {
        return Err(FieldValidationError::NegativeQuantity);
    }
    Ok(quantity)
}

/// Render a form value as text before validating it.
///
/// Whole numbers print without a fractional part, so `2.0` reads as `2`.
pub fn field_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
