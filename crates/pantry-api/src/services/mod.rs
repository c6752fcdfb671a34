//! Pipeline services.
//!
//! Producers stage an artifact and publish a notification; consumers are invoked by
//! push delivery (HTTP or in-process) and do the fetch, transform and persist work.
//! Handlers stay thin and these functions carry the behavior, so they can be driven
//! directly from tests.

pub mod audit;
pub mod bulk_consumer;
pub mod bulk_producer;
pub mod catalog;
pub mod thumbnail;
