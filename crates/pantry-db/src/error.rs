use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub fn not_found(collection: &str, key: &str) -> Self {
        DbError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }
}
