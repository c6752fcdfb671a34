//! Notification channel setup

use anyhow::Result;
use pantry_core::{Config, DeliveryMode};
use pantry_worker::{
    ContextPushTarget, HttpPushTarget, InProcessChannel, InProcessChannelConfig,
    NotificationChannel, PushTarget,
};
use std::sync::Arc;

/// Build the channel and its push target.
///
/// For in-process delivery the returned target is still unbound; the caller binds
/// it once the application state exists.
pub fn setup_channel(
    config: &Config,
) -> Result<(Arc<dyn NotificationChannel>, Option<Arc<ContextPushTarget>>)> {
    let channel_config = InProcessChannelConfig::from_app_config(config);

    let (target, context_target) = match config.notification_delivery() {
        DeliveryMode::Http => {
            let target: Arc<dyn PushTarget> =
                Arc::new(HttpPushTarget::new(channel_config.ack_deadline)?);
            (target, None)
        }
        DeliveryMode::InProcess => {
            let context_target = Arc::new(ContextPushTarget::new());
            let target: Arc<dyn PushTarget> = context_target.clone();
            (target, Some(context_target))
        }
    };

    tracing::info!(
        delivery = %config.notification_delivery(),
        max_retries = channel_config.max_retries,
        ack_deadline_secs = channel_config.ack_deadline.as_secs(),
        max_in_flight = channel_config.max_in_flight,
        "Notification channel initialized"
    );

    let channel: Arc<dyn NotificationChannel> =
        Arc::new(InProcessChannel::new(target, channel_config));
    Ok((channel, context_target))
}
