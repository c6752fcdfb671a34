//! Pantry Processing Library
//!
//! Pure transforms used by the pipelines: bulk file validation and parsing,
//! per-record column rules, catalog field validators and thumbnail generation.
//! Nothing in this crate performs I/O beyond in-memory buffers.

pub mod columns;
pub mod image;
pub mod ingest;
pub mod validators;

pub use crate::columns::{apply_column_policy, csv_record, ColumnError};
pub use crate::image::{
    detect_image_type, encode_jpeg, resize_to_thumbnail, ImageKind, ThumbnailError,
};
pub use crate::ingest::{parse_csv, parse_json, validate_csv, validate_json, CsvTable, SchemaError};
pub use crate::validators::{
    field_as_text, validate_item_package_quantity, validate_price, FieldValidationError,
};
