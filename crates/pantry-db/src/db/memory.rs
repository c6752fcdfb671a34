use super::query::{compare_values, matches_filter, Document, Page, RecordQuery};
use super::{generate_key, RecordStore};
use crate::error::{DbError, DbResult};
use pantry_core::FieldMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Record store held in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<String, BTreeMap<String, FieldMap>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Every document in a collection, in key order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, data)| Document {
                        key: key.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn set(&self, collection: &str, key: &str, data: FieldMap) -> DbResult<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), data);
        Ok(())
    }

    async fn merge(&self, collection: &str, key: &str, partial: FieldMap) -> DbResult<()> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .entry(collection.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default();
        for (field, value) in partial {
            doc.insert(field, value);
        }
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> DbResult<FieldMap> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned()
            .ok_or_else(|| DbError::not_found(collection, key))
    }

    async fn delete(&self, collection: &str, key: &str) -> DbResult<()> {
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn add(&self, collection: &str, data: FieldMap) -> DbResult<String> {
        let key = generate_key();
        self.set(collection, &key, data).await?;
        Ok(key)
    }

    async fn query(&self, collection: &str, query: &RecordQuery) -> DbResult<Page> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Page::default());
        };

        let sort_value = |key: &str, data: &FieldMap| -> Option<Value> {
            match query.order_by.as_deref() {
                Some(field) => data.get(field).cloned(),
                None => Some(Value::String(key.to_string())),
            }
        };

        let mut matching: Vec<(Value, Document)> = docs
            .iter()
            .filter(|(_, data)| query.filters.iter().all(|f| matches_filter(data, f)))
            .filter_map(|(key, data)| {
                sort_value(key, data).map(|value| {
                    (
                        value,
                        Document {
                            key: key.clone(),
                            data: data.clone(),
                        },
                    )
                })
            })
            .filter(|(value, _)| match &query.start_after {
                Some(cursor) => compare_values(value, cursor).is_gt(),
                None => true,
            })
            .collect();

        matching.sort_by(|(a, doc_a), (b, doc_b)| {
            compare_values(a, b).then_with(|| doc_a.key.cmp(&doc_b.key))
        });

        let documents: Vec<Document> = matching
            .into_iter()
            .map(|(_, doc)| doc)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(Page::from_documents(documents, query))
    }
}
