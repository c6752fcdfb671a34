//! Test helpers: build AppState and router over in-memory backends.
//!
//! Run from workspace root: `cargo test -p pantry-api`.

pub mod fixtures;
pub mod record_store;

use anyhow::Result;
use async_trait::async_trait;
use axum_test::TestServer;
use pantry_api::setup::routes;
use pantry_api::AppState;
use pantry_core::{AppConfig, Config};
use pantry_db::{MemoryRecordStore, RecordStore};
use pantry_storage::{MemoryStorage, Storage};
use pantry_worker::{
    ContextPushTarget, InProcessChannel, InProcessChannelConfig, PushHandlerContext, PushMessage,
    PushTarget,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use record_store::{AddFaults, FaultyRecordStore};

/// Records every push. With `forward` set it also hands the message to the app.
pub struct RecordingTarget {
    pushes: Mutex<Vec<(String, PushMessage)>>,
    forward: Option<ContextPushTarget>,
}

impl RecordingTarget {
    pub async fn pushes(&self) -> Vec<(String, PushMessage)> {
        self.pushes.lock().await.clone()
    }

    /// Wait until at least `count` pushes were seen, or give up after two seconds.
    pub async fn wait_for(&self, count: usize) -> Vec<(String, PushMessage)> {
        for _ in 0..200 {
            let pushes = self.pushes().await;
            if pushes.len() >= count {
                return pushes;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.pushes().await
    }
}

#[async_trait]
impl PushTarget for RecordingTarget {
    async fn push(&self, endpoint: &str, message: &PushMessage) -> Result<()> {
        self.pushes
            .lock()
            .await
            .push((endpoint.to_string(), message.clone()));
        match &self.forward {
            Some(target) => target.push(endpoint, message).await,
            None => Ok(()),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<MemoryStorage>,
    pub records: Arc<MemoryRecordStore>,
    pub pushes: Arc<RecordingTarget>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Bytes of a staged object, addressed by the URL it was returned under.
    pub async fn staged(&self, url: &str) -> Vec<u8> {
        let key = self.storage.key_from_url(url).expect("url owned by the store");
        self.storage.get(&key).await.expect("staged object")
    }
}

fn test_config(customize: impl FnOnce(&mut AppConfig)) -> Config {
    let mut app = AppConfig::default();
    customize(&mut app);
    Config(Box::new(app))
}

fn test_channel_config() -> InProcessChannelConfig {
    InProcessChannelConfig {
        backoff_unit: Duration::from_millis(1),
        ..InProcessChannelConfig::default()
    }
}

/// Deliveries are recorded only; tests drive the consumer endpoints themselves.
pub async fn setup_test_app() -> TestApp {
    build(|_| {}, false, test_channel_config(), None).await
}

pub async fn setup_test_app_with(customize: impl FnOnce(&mut AppConfig)) -> TestApp {
    build(customize, false, test_channel_config(), None).await
}

/// Record writes go through a [`FaultyRecordStore`].
pub async fn setup_test_app_with_faults(faults: AddFaults) -> TestApp {
    build(|_| {}, false, test_channel_config(), Some(faults)).await
}

/// Deliveries are recorded and dispatched to the consumers in this process.
pub async fn setup_in_process_app() -> TestApp {
    build(|_| {}, true, test_channel_config(), None).await
}

pub async fn setup_in_process_app_with(
    channel_config: InProcessChannelConfig,
    faults: AddFaults,
) -> TestApp {
    build(|_| {}, true, channel_config, Some(faults)).await
}

async fn build(
    customize: impl FnOnce(&mut AppConfig),
    forward: bool,
    channel_config: InProcessChannelConfig,
    faults: Option<AddFaults>,
) -> TestApp {
    let config = test_config(customize);

    let storage = Arc::new(MemoryStorage::new());
    let records = Arc::new(MemoryRecordStore::new());
    let store: Arc<dyn RecordStore> = match faults {
        Some(faults) => Arc::new(FaultyRecordStore::new(records.clone(), faults)),
        None => records.clone(),
    };
    let pushes = Arc::new(RecordingTarget {
        pushes: Mutex::new(Vec::new()),
        forward: forward.then(ContextPushTarget::new),
    });

    let channel = Arc::new(InProcessChannel::new(pushes.clone(), channel_config));

    let state = Arc::new(
        AppState::new(config.clone(), storage.clone(), store, channel, None)
            .expect("app state"),
    );

    if let Some(target) = pushes.forward.as_ref() {
        let ctx: Arc<dyn PushHandlerContext> = state.clone();
        target.bind(Arc::downgrade(&ctx));
    }

    let router = routes::setup_routes(&config, state.clone());
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        storage,
        records,
        pushes,
    }
}
