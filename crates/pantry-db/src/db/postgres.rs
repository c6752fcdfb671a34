use super::query::{Document, FilterOp, Page, RecordQuery};
use super::{generate_key, RecordStore};
use crate::error::{DbError, DbResult};
use pantry_core::FieldMap;
use serde_json::Value;
use sqlx::{PgPool, Postgres};

/// Record store over the `documents` JSONB table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_field_map(value: Value) -> DbResult<FieldMap> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DbError::InvalidDocument(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}

#[async_trait::async_trait]
impl RecordStore for PgRecordStore {
    #[tracing::instrument(skip(self, data), fields(db.table = "documents", db.operation = "upsert"))]
    async fn set(&self, collection: &str, key: &str, data: FieldMap) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, partial), fields(db.table = "documents", db.operation = "merge"))]
    async fn merge(&self, collection: &str, key: &str, partial: FieldMap) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, key)
            DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Value::Object(partial))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn get(&self, collection: &str, key: &str) -> DbResult<FieldMap> {
        let data = sqlx::query_scalar::<Postgres, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND key = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found(collection, key))?;

        into_field_map(data)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "delete"))]
    async fn delete(&self, collection: &str, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, data), fields(db.table = "documents", db.operation = "insert"))]
    async fn add(&self, collection: &str, data: FieldMap) -> DbResult<String> {
        let key = generate_key();
        sqlx::query("INSERT INTO documents (collection, key, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&key)
            .bind(Value::Object(data))
            .execute(&self.pool)
            .await?;

        Ok(key)
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    async fn query(&self, collection: &str, query: &RecordQuery) -> DbResult<Page> {
        let mut sql = String::from("SELECT key, data FROM documents WHERE collection = $1");
        let mut param_count = 2;

        // Field names are bound, never interpolated.
        for filter in &query.filters {
            let op = match filter.op {
                FilterOp::Eq => "=",
                FilterOp::Gt => ">",
                FilterOp::Lt => "<",
            };
            sql.push_str(&format!(
                " AND data -> ${f} {op} ${v}::jsonb AND jsonb_typeof(data -> ${f}) = jsonb_typeof(${v}::jsonb)",
                f = param_count,
                v = param_count + 1,
                op = op,
            ));
            param_count += 2;
        }

        let order_param = if query.order_by.is_some() {
            sql.push_str(&format!(" AND data ? ${}", param_count));
            let p = param_count;
            param_count += 1;
            Some(p)
        } else {
            None
        };

        if query.start_after.is_some() {
            match order_param {
                Some(p) => sql.push_str(&format!(" AND data -> ${} > ${}::jsonb", p, param_count)),
                None => sql.push_str(&format!(" AND key > ${}", param_count)),
            }
            param_count += 1;
        }

        match order_param {
            Some(p) => sql.push_str(&format!(" ORDER BY data -> ${} ASC, key ASC", p)),
            None => sql.push_str(" ORDER BY key ASC"),
        }

        if query.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", param_count));
        }

        let mut q = sqlx::query_as::<Postgres, (String, Value)>(&sql).bind(collection);
        for filter in &query.filters {
            q = q.bind(filter.field.clone()).bind(filter.value.clone());
        }
        if let Some(ref field) = query.order_by {
            q = q.bind(field.clone());
        }
        if let Some(ref cursor) = query.start_after {
            q = match order_param {
                Some(_) => q.bind(cursor.clone()),
                None => q.bind(cursor.as_str().unwrap_or_default().to_string()),
            };
        }
        if let Some(limit) = query.limit {
            q = q.bind(limit as i64);
        }

        let rows = q.fetch_all(&self.pool).await?;

        let documents = rows
            .into_iter()
            .map(|(key, data)| Ok(Document { key, data: into_field_map(data)? }))
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::from_documents(documents, query))
    }
}
