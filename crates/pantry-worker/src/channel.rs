//! Notification channel trait

use async_trait::async_trait;
use pantry_core::NotificationEvent;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("subscription '{name}' could not be provisioned: {reason}")]
    Provisioning { name: String, reason: String },

    #[error("subscription '{0}' is not accepting messages, try again later")]
    Backpressure(String),

    #[error("notification channel is shut down")]
    Closed,

    #[error("publish failed: {0}")]
    Publish(String),
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// At-least-once publish/subscribe.
///
/// Topics and subscriptions are created on demand; provisioning an existing one is
/// a no-op. Every message published to a topic is pushed to each of its
/// subscriptions' endpoints until acknowledged or dead-lettered.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn ensure_topic(&self, name: &str) -> ChannelResult<()>;

    async fn ensure_subscription(
        &self,
        name: &str,
        topic: &str,
        push_endpoint: &str,
    ) -> ChannelResult<()>;

    /// Returns the message id.
    async fn publish(&self, topic: &str, payload: Value) -> ChannelResult<String>;

    /// Provision the event's topic and subscription, then publish its payload.
    async fn publish_event(&self, event: &NotificationEvent) -> ChannelResult<String> {
        self.ensure_topic(&event.topic).await?;
        self.ensure_subscription(&event.subscription_name, &event.topic, &event.push_endpoint)
            .await?;
        let message_id = self.publish(&event.topic, event.payload.clone()).await?;
        tracing::info!(
            topic = %event.topic,
            subscription = %event.subscription_name,
            message_id = %message_id,
            "Notification published"
        );
        Ok(message_id)
    }

    /// Stop delivery workers. Undelivered messages are dropped.
    async fn shutdown(&self);
}
