//! Retrieval of staged artifacts by URL.

use crate::{Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::Duration;

/// Reads the artifact a notification payload points at.
///
/// URLs produced by the configured store are read through it directly; any other
/// URL is fetched with an HTTP GET and must answer `200 OK`.
#[derive(Clone)]
pub struct ArtifactFetcher {
    storage: Arc<dyn Storage>,
    http: reqwest::Client,
}

impl ArtifactFetcher {
    pub fn new(storage: Arc<dyn Storage>, timeout: Duration) -> StorageResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { storage, http })
    }

    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();

        let data = match self.storage.key_from_url(url) {
            Some(key) => self.storage.get(&key).await?,
            None => self.fetch_remote(url).await?,
        };

        if data.is_empty() {
            return Err(StorageError::EmptyContent);
        }

        tracing::debug!(
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact fetched"
        );

        Ok(data)
    }

    async fn fetch_remote(&self, url: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Transport(format!("failed to fetch artifact: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(status = %status, "Artifact fetch returned non-OK status");
            return Err(StorageError::Transport(format!(
                "non-OK response: {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(format!("failed to read artifact body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn fetcher(storage: Arc<dyn Storage>) -> ArtifactFetcher {
        ArtifactFetcher::new(storage, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn store_owned_urls_are_read_from_the_store() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let url = storage
            .put("bulk/1_groceries.csv", b"a,b\n1,2\n".to_vec(), "text/csv")
            .await
            .unwrap();

        let data = fetcher(storage).fetch(&url).await.unwrap();
        assert_eq!(data, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn foreign_urls_are_fetched_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exports/groceries.json")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let url = format!("{}/exports/groceries.json", server.url());
        let data = fetcher(Arc::new(MemoryStorage::new()))
            .fetch(&url)
            .await
            .unwrap();

        assert_eq!(data, b"[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_ok_status_is_a_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.csv")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.csv", server.url());
        let err = fetcher(Arc::new(MemoryStorage::new()))
            .fetch(&url)
            .await
            .unwrap_err();

        match err {
            StorageError::Transport(msg) => assert_eq!(msg, "non-OK response: 404 Not Found"),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_store_object_is_not_found() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let url = storage.generate_url("bulk/never_staged.csv");
        let err = fetcher(storage).fetch(&url).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
