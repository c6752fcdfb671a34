//! HTTP handlers. Each one reads the request, calls into `services` and renders the result.

pub mod bulk;
pub mod catalog;
pub mod health;
pub mod push;
