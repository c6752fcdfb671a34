//! Data models for the application
//!
//! Each sub-module covers one pipeline concern: staged artifacts, bulk records,
//! notification events and audit records.

mod artifact;
mod audit;
mod bulk;
mod notification;

// Re-export all models for convenient imports
pub use artifact::*;
pub use audit::*;
pub use bulk::*;
pub use notification::*;
