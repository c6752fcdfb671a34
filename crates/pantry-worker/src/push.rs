//! Push targets: how a subscription hands a message to its endpoint.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{RwLock, Weak};
use std::time::Duration;

use crate::context::{empty_context_weak, PushHandlerContext};

/// One delivery attempt of a published message.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub message_id: String,
    pub subscription: String,
    pub payload: Value,
    /// Zero for the first delivery.
    pub attempt: u32,
}

/// Delivers a message to a push endpoint. `Ok` is an acknowledgement.
#[async_trait]
pub trait PushTarget: Send + Sync {
    async fn push(&self, endpoint: &str, message: &PushMessage) -> Result<()>;
}

/// POSTs the payload as JSON; any 2xx response acknowledges.
#[derive(Clone)]
pub struct HttpPushTarget {
    client: reqwest::Client,
}

impl HttpPushTarget {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build push HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PushTarget for HttpPushTarget {
    async fn push(&self, endpoint: &str, message: &PushMessage) -> Result<()> {
        let response = self
            .client
            .post(endpoint)
            .header("X-Message-Id", &message.message_id)
            .json(&message.payload)
            .send()
            .await
            .with_context(|| format!("push to {} failed", endpoint))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("push endpoint returned {}: {}", status, body))
        }
    }
}

/// Dispatches to the application's handler context in this process.
///
/// Starts unbound; `bind` installs the context once the application state exists.
/// Each dispatch runs to completion even when the caller stops waiting for it.
pub struct ContextPushTarget {
    context: RwLock<Weak<dyn PushHandlerContext>>,
}

impl ContextPushTarget {
    pub fn new() -> Self {
        Self {
            context: RwLock::new(empty_context_weak()),
        }
    }

    pub fn bind(&self, context: Weak<dyn PushHandlerContext>) {
        match self.context.write() {
            Ok(mut guard) => *guard = context,
            Err(poisoned) => *poisoned.into_inner() = context,
        }
    }
}

impl Default for ContextPushTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushTarget for ContextPushTarget {
    async fn push(&self, endpoint: &str, message: &PushMessage) -> Result<()> {
        let context = self
            .context
            .read()
            .map_err(|_| anyhow!("push handler context lock poisoned"))?
            .upgrade()
            .ok_or_else(|| anyhow!("PushHandlerContext was dropped, cannot deliver message"))?;

        // The consumer runs on its own task: a missed ack deadline drops this
        // future, never the work in progress.
        let endpoint = endpoint.to_string();
        let payload = message.payload.clone();
        tokio::spawn(async move { context.dispatch(&endpoint, &payload).await })
            .await
            .map_err(|e| anyhow!("push handler task failed: {}", e))?
    }
}
