//! Pantry Storage Library
//!
//! Artifact store abstraction with S3, local filesystem and in-memory backends,
//! plus the fetcher consumers use to read a staged artifact back by URL.
//!
//! # Key layout
//!
//! One bucket (or directory) holds every artifact, partitioned by prefix:
//!
//! - **Bulk files**: `bulk/{timestamp}_{filename}`
//! - **Item images**: `images/{unix_nanos}_{filename}`
//! - **Thumbnails**: `thumbnails/{unix_nanos}_thumbnail_{id}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation lives in the
//! `keys` module so producers never build keys by hand.

pub mod factory;
pub mod fetch;
pub mod keys;
pub mod local;
pub mod memory;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use fetch::ArtifactFetcher;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use pantry_core::StorageBackend;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
