//! Record store wrapper that slows down or fails writes.

use async_trait::async_trait;
use pantry_core::FieldMap;
use pantry_db::{DbError, DbResult, MemoryRecordStore, Page, RecordQuery, RecordStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a [`FaultyRecordStore`] misbehaves on `add`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddFaults {
    /// 1-based index of the `add` call that fails.
    pub fail_on: Option<usize>,
    /// Sleep before every `add`.
    pub delay: Duration,
}

/// Delegates to a memory store, so tests can still inspect what was written.
pub struct FaultyRecordStore {
    inner: Arc<MemoryRecordStore>,
    faults: AddFaults,
    adds: AtomicUsize,
}

impl FaultyRecordStore {
    pub fn new(inner: Arc<MemoryRecordStore>, faults: AddFaults) -> Self {
        Self {
            inner,
            faults,
            adds: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for FaultyRecordStore {
    async fn set(&self, collection: &str, key: &str, data: FieldMap) -> DbResult<()> {
        self.inner.set(collection, key, data).await
    }

    async fn merge(&self, collection: &str, key: &str, partial: FieldMap) -> DbResult<()> {
        self.inner.merge(collection, key, partial).await
    }

    async fn get(&self, collection: &str, key: &str) -> DbResult<FieldMap> {
        self.inner.get(collection, key).await
    }

    async fn delete(&self, collection: &str, key: &str) -> DbResult<()> {
        self.inner.delete(collection, key).await
    }

    async fn add(&self, collection: &str, data: FieldMap) -> DbResult<String> {
        let call = self.adds.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.faults.delay.is_zero() {
            tokio::time::sleep(self.faults.delay).await;
        }
        if self.faults.fail_on == Some(call) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.inner.add(collection, data).await
    }

    async fn query(&self, collection: &str, query: &RecordQuery) -> DbResult<Page> {
        self.inner.query(collection, query).await
    }
}
