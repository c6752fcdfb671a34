//! Push handler context trait
//!
//! The API implements this trait for its application state. In-process delivery
//! calls `dispatch` with the subscription's endpoint; the implementation matches
//! on the endpoint path and invokes the consumer registered for it.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Context for in-process push delivery.
///
/// The channel holds a weak reference so it never keeps the application state alive.
#[async_trait]
pub trait PushHandlerContext: Send + Sync {
    /// Handle one delivery. `Ok` acknowledges the message; `Err` asks for redelivery.
    async fn dispatch(self: Arc<Self>, endpoint: &str, payload: &Value) -> Result<()>;
}

/// Placeholder context used before the real context exists. Dispatch always errors.
struct NoopContext;

#[async_trait]
impl PushHandlerContext for NoopContext {
    async fn dispatch(self: Arc<Self>, _endpoint: &str, _payload: &Value) -> Result<()> {
        Err(anyhow!("NoopContext: no handler context available"))
    }
}

/// Returns a weak reference to a no-op context; it never upgrades.
pub fn empty_context_weak() -> Weak<dyn PushHandlerContext> {
    let n: Arc<dyn PushHandlerContext> = Arc::new(NoopContext);
    Arc::downgrade(&n)
}

/// Path component of a push endpoint: `http://host:8084/api/thumbnail` -> `/api/thumbnail`.
pub fn endpoint_path(endpoint: &str) -> &str {
    let without_scheme = match endpoint.find("://") {
        Some(idx) => &endpoint[idx + 3..],
        None => return endpoint.split(['?', '#']).next().unwrap_or(endpoint),
    };
    let path = match without_scheme.find('/') {
        Some(idx) => &without_scheme[idx..],
        None => "/",
    };
    path.split(['?', '#']).next().unwrap_or(path)
}
