//! Record store trait and backends
//!
//! Collections are created implicitly on first write. `merge` is an upsert that
//! replaces only the top-level fields it carries.

pub mod memory;
pub mod postgres;
pub mod query;

use crate::error::DbResult;
use pantry_core::FieldMap;
use query::{Page, RecordQuery};

#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Create or overwrite the document at `key`.
    async fn set(&self, collection: &str, key: &str, data: FieldMap) -> DbResult<()>;

    /// Upsert `partial` into the document at `key`, leaving other fields untouched.
    async fn merge(&self, collection: &str, key: &str, partial: FieldMap) -> DbResult<()>;

    /// Fetch a document, failing with `DbError::NotFound` when absent.
    async fn get(&self, collection: &str, key: &str) -> DbResult<FieldMap>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, key: &str) -> DbResult<()>;

    /// Store a new document under a generated key and return the key.
    async fn add(&self, collection: &str, data: FieldMap) -> DbResult<String>;

    async fn query(&self, collection: &str, query: &RecordQuery) -> DbResult<Page>;
}

/// Keys for `add` are random and unique per call.
pub(crate) fn generate_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
