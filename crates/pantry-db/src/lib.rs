//! Pantry Record Store
//!
//! Document collections of JSON objects, addressed by collection name and string
//! key. A PostgreSQL JSONB backend serves production and an in-memory backend
//! serves tests and single-process runs; both sit behind [`RecordStore`].

pub mod db;
pub mod error;

pub use db::memory::MemoryRecordStore;
pub use db::postgres::PgRecordStore;
pub use db::query::{Document, Filter, FilterOp, Page, RecordQuery};
pub use db::RecordStore;
pub use error::{DbError, DbResult};
