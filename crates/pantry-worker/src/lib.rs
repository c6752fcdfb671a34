//! Pantry Worker – notification channel and background delivery.
//!
//! This crate provides the at-least-once publish/subscribe channel that connects
//! producers to consumers, the push targets it delivers through, and the bounded
//! pool consumers use to fan work out. The API implements `PushHandlerContext`
//! for its application state so deliveries can be dispatched in-process.

mod channel;
mod context;
mod in_process;
mod pool;
mod push;

pub use channel::{ChannelError, ChannelResult, NotificationChannel};
pub use context::{empty_context_weak, endpoint_path, PushHandlerContext};
pub use in_process::{InProcessChannel, InProcessChannelConfig, MAX_RETRY_BACKOFF_SECS};
pub use pool::{run_bounded, PoolReport, UnitOutcome};
pub use push::{ContextPushTarget, HttpPushTarget, PushMessage, PushTarget};
