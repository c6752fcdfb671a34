//! In-process notification channel: per-subscription delivery workers, bounded
//! queues, ack deadlines and capped exponential redelivery.
//!
//! Shutdown: [`InProcessChannel::shutdown`] cancels every delivery worker. Messages
//! still queued or waiting for redelivery are dropped, matching the at-least-once
//! contract only for messages already acknowledged.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelError, ChannelResult, NotificationChannel};
use crate::push::{PushMessage, PushTarget};

/// Maximum delay in seconds before redelivering a message. Caps exponential backoff
/// so that high retry counts do not produce excessively long delays.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 300;

/// Computes backoff in seconds for a given retry count (exponential with cap).
#[inline]
pub(crate) fn compute_retry_backoff_seconds(retry_count: u32) -> u64 {
    2_u64
        .checked_pow(retry_count)
        .unwrap_or(u64::MAX)
        .min(MAX_RETRY_BACKOFF_SECS)
}

#[derive(Clone, Debug)]
pub struct InProcessChannelConfig {
    /// Redeliveries after the first attempt before a message is dead-lettered.
    pub max_retries: u32,
    /// A push that has not acknowledged within this window counts as a failure.
    pub ack_deadline: Duration,
    /// Concurrent deliveries per subscription.
    pub max_in_flight: usize,
    /// Messages buffered per subscription before publish reports backpressure.
    pub queue_capacity: usize,
    /// Length of one backoff second; shortened in tests.
    pub backoff_unit: Duration,
}

impl Default for InProcessChannelConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            ack_deadline: Duration::from_secs(10),
            max_in_flight: 8,
            queue_capacity: 1024,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl InProcessChannelConfig {
    pub fn from_app_config(config: &pantry_core::Config) -> Self {
        Self {
            max_retries: config.notification_max_retries(),
            ack_deadline: Duration::from_secs(config.notification_ack_deadline_secs()),
            max_in_flight: config.notification_max_in_flight(),
            queue_capacity: config.notification_queue_capacity(),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

struct SubscriptionHandle {
    topic: String,
    endpoint: String,
    sender: mpsc::Sender<PushMessage>,
}

#[derive(Default)]
struct Topology {
    topics: HashMap<String, BTreeSet<String>>,
    subscriptions: HashMap<String, SubscriptionHandle>,
}

pub struct InProcessChannel {
    topology: RwLock<Topology>,
    target: Arc<dyn PushTarget>,
    config: InProcessChannelConfig,
    cancel: CancellationToken,
}

impl InProcessChannel {
    pub fn new(target: Arc<dyn PushTarget>, config: InProcessChannelConfig) -> Self {
        Self {
            topology: RwLock::new(Topology::default()),
            target,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Names of the subscriptions attached to a topic.
    pub async fn subscriptions(&self, topic: &str) -> Vec<String> {
        self.topology
            .read()
            .await
            .topics
            .get(topic)
            .map(|subs| subs.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn subscription_worker(
        name: String,
        endpoint: String,
        mut receiver: mpsc::Receiver<PushMessage>,
        target: Arc<dyn PushTarget>,
        config: InProcessChannelConfig,
        cancel: CancellationToken,
    ) {
        tracing::info!(
            subscription = %name,
            endpoint = %endpoint,
            max_in_flight = config.max_in_flight,
            "Subscription delivery worker started"
        );

        let semaphore = Arc::new(Semaphore::new(config.max_in_flight));

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = receiver.recv() => {
                    let Some(message) = message else { break };
                    let permit = tokio::select! {
                        _ = cancel.cancelled() => break,
                        permit = semaphore.clone().acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                    };

                    let target = target.clone();
                    let endpoint = endpoint.clone();
                    let config = config.clone();
                    let cancel = cancel.clone();
                    let semaphore = semaphore.clone();
                    tokio::spawn(async move {
                        Self::deliver_with_retry(message, endpoint, target, config, cancel, semaphore, permit)
                            .await;
                    });
                }
            }
        }

        tracing::info!(subscription = %name, "Subscription delivery worker stopped");
    }

    #[tracing::instrument(
        skip(message, target, config, cancel, semaphore, permit),
        fields(message_id = %message.message_id, subscription = %message.subscription)
    )]
    async fn deliver_with_retry(
        mut message: PushMessage,
        endpoint: String,
        target: Arc<dyn PushTarget>,
        config: InProcessChannelConfig,
        cancel: CancellationToken,
        semaphore: Arc<Semaphore>,
        permit: tokio::sync::OwnedSemaphorePermit,
    ) {
        let mut permit = Some(permit);

        loop {
            if permit.is_none() {
                permit = tokio::select! {
                    _ = cancel.cancelled() => return,
                    p = semaphore.clone().acquire_owned() => match p {
                        Ok(p) => Some(p),
                        Err(_) => return,
                    },
                };
            }

            let result =
                tokio::time::timeout(config.ack_deadline, target.push(&endpoint, &message)).await;

            let error = match result {
                Ok(Ok(())) => {
                    tracing::debug!(attempt = message.attempt, "Message acknowledged");
                    return;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!(
                    "ack deadline of {}s exceeded",
                    config.ack_deadline.as_secs_f64()
                ),
            };

            // Release the slot while waiting so other messages keep flowing.
            permit = None;

            if message.attempt >= config.max_retries {
                tracing::error!(
                    endpoint = %endpoint,
                    attempts = message.attempt + 1,
                    error = %error,
                    payload = %message.payload,
                    "Message dead-lettered after maximum retries"
                );
                return;
            }

            let backoff_seconds = compute_retry_backoff_seconds(message.attempt);
            tracing::warn!(
                endpoint = %endpoint,
                attempt = message.attempt,
                backoff_seconds = backoff_seconds,
                error = %error,
                "Push not acknowledged, scheduling redelivery"
            );

            let delay = config
                .backoff_unit
                .saturating_mul(backoff_seconds.min(u32::MAX as u64) as u32);
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            message.attempt += 1;
        }
    }
}

#[async_trait]
impl NotificationChannel for InProcessChannel {
    async fn ensure_topic(&self, name: &str) -> ChannelResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        let mut topology = self.topology.write().await;
        if !topology.topics.contains_key(name) {
            topology.topics.insert(name.to_string(), BTreeSet::new());
            tracing::info!(topic = %name, "Topic created");
        }
        Ok(())
    }

    async fn ensure_subscription(
        &self,
        name: &str,
        topic: &str,
        push_endpoint: &str,
    ) -> ChannelResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        let mut topology = self.topology.write().await;

        if let Some(existing) = topology.subscriptions.get(name) {
            if existing.topic != topic {
                return Err(ChannelError::Provisioning {
                    name: name.to_string(),
                    reason: format!("already attached to topic '{}'", existing.topic),
                });
            }
            if existing.endpoint != push_endpoint {
                tracing::warn!(
                    subscription = %name,
                    endpoint = %existing.endpoint,
                    requested_endpoint = %push_endpoint,
                    "Subscription exists with a different push endpoint, keeping existing"
                );
            }
            return Ok(());
        }

        let Some(subscribers) = topology.topics.get_mut(topic) else {
            return Err(ChannelError::TopicNotFound(topic.to_string()));
        };
        subscribers.insert(name.to_string());

        let (sender, receiver) = mpsc::channel(self.config.queue_capacity);
        tokio::spawn(Self::subscription_worker(
            name.to_string(),
            push_endpoint.to_string(),
            receiver,
            self.target.clone(),
            self.config.clone(),
            self.cancel.clone(),
        ));

        topology.subscriptions.insert(
            name.to_string(),
            SubscriptionHandle {
                topic: topic.to_string(),
                endpoint: push_endpoint.to_string(),
                sender,
            },
        );
        tracing::info!(subscription = %name, topic = %topic, endpoint = %push_endpoint, "Subscription created");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Value) -> ChannelResult<String> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Closed);
        }
        let topology = self.topology.read().await;
        let subscribers = topology
            .topics
            .get(topic)
            .ok_or_else(|| ChannelError::TopicNotFound(topic.to_string()))?;

        let message_id = uuid::Uuid::new_v4().to_string();

        if subscribers.is_empty() {
            tracing::debug!(topic = %topic, message_id = %message_id, "Topic has no subscriptions, message dropped");
        }

        for name in subscribers {
            let Some(subscription) = topology.subscriptions.get(name) else {
                continue;
            };
            let message = PushMessage {
                message_id: message_id.clone(),
                subscription: name.clone(),
                payload: payload.clone(),
                attempt: 0,
            };
            subscription.sender.try_send(message).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ChannelError::Backpressure(name.clone()),
                mpsc::error::TrySendError::Closed(_) => ChannelError::Closed,
            })?;
        }

        Ok(message_id)
    }

    async fn shutdown(&self) {
        tracing::info!("Initiating notification channel shutdown");
        self.cancel.cancel();
    }
}
