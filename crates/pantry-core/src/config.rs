//! Configuration module
//!
//! Everything the API and its pipelines need is read from the environment once at
//! startup. Backend-specific settings are optional and checked by `validate()`.

use std::env;

use crate::models::{JsonFailurePolicy, PricePolicy};
use crate::storage_types::{DeliveryMode, RecordStoreBackend, StorageBackend};

// Common constants
const SERVER_PORT: u16 = 8084;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const NOTIFICATION_MAX_RETRIES: u32 = 3;
const NOTIFICATION_ACK_DEADLINE_SECS: u64 = 10;
const NOTIFICATION_MAX_IN_FLIGHT: usize = 8;
const NOTIFICATION_QUEUE_CAPACITY: usize = 1024;
const BULK_CONSUMER_CONCURRENCY: usize = 16;
const HTTP_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub environment: String,
    pub max_upload_size_bytes: usize,
    /// Base URL push endpoints are resolved against.
    pub public_base_url: String,
    pub log_format: String,
    // Artifact store
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Record store
    pub record_store_backend: RecordStoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Notification channel
    pub notification_delivery: DeliveryMode,
    pub notification_max_retries: u32,
    pub notification_ack_deadline_secs: u64,
    pub notification_max_in_flight: usize,
    pub notification_queue_capacity: usize,
    // Bulk consumer
    pub bulk_consumer_concurrency: usize,
    pub bulk_json_failure_policy: JsonFailurePolicy,
    pub bulk_price_policy: PricePolicy,
    pub http_fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    /// Single-process settings: memory stores and in-process delivery.
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            public_base_url: format!("http://localhost:{}", SERVER_PORT),
            log_format: "compact".to_string(),
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            record_store_backend: RecordStoreBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            notification_delivery: DeliveryMode::InProcess,
            notification_max_retries: NOTIFICATION_MAX_RETRIES,
            notification_ack_deadline_secs: NOTIFICATION_ACK_DEADLINE_SECS,
            notification_max_in_flight: NOTIFICATION_MAX_IN_FLIGHT,
            notification_queue_capacity: NOTIFICATION_QUEUE_CAPACITY,
            bulk_consumer_concurrency: BULK_CONSUMER_CONCURRENCY,
            bulk_json_failure_policy: JsonFailurePolicy::default(),
            bulk_price_policy: PricePolicy::default(),
            http_fetch_timeout_secs: HTTP_FETCH_TIMEOUT_SECS,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn as_app(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_app().environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_app().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_app().server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_app().environment
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_app().max_upload_size_bytes
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_app().public_base_url
    }

    /// Absolute push endpoint for a consumer path such as `/api/downloadcsv`.
    pub fn push_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.public_base_url().trim_end_matches('/'), path)
    }

    pub fn log_format(&self) -> &str {
        &self.as_app().log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_app().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_app().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_app()
            .s3_region
            .as_deref()
            .or(self.as_app().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_app().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_app().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_app().local_storage_base_url.as_deref()
    }

    pub fn record_store_backend(&self) -> RecordStoreBackend {
        self.as_app().record_store_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_app().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_app().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_app().db_timeout_seconds
    }

    pub fn notification_delivery(&self) -> DeliveryMode {
        self.as_app().notification_delivery
    }

    pub fn notification_max_retries(&self) -> u32 {
        self.as_app().notification_max_retries
    }

    pub fn notification_ack_deadline_secs(&self) -> u64 {
        self.as_app().notification_ack_deadline_secs
    }

    pub fn notification_max_in_flight(&self) -> usize {
        self.as_app().notification_max_in_flight
    }

    pub fn notification_queue_capacity(&self) -> usize {
        self.as_app().notification_queue_capacity
    }

    pub fn bulk_consumer_concurrency(&self) -> usize {
        self.as_app().bulk_consumer_concurrency
    }

    pub fn bulk_json_failure_policy(&self) -> JsonFailurePolicy {
        self.as_app().bulk_json_failure_policy
    }

    pub fn bulk_price_policy(&self) -> PricePolicy {
        self.as_app().bulk_price_policy
    }

    pub fn http_fetch_timeout_secs(&self) -> u64 {
        self.as_app().http_fetch_timeout_secs
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => StorageBackend::Memory,
        };

        let record_store_backend = match env::var("RECORD_STORE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => RecordStoreBackend::Memory,
        };

        let notification_delivery = match env::var("NOTIFICATION_DELIVERY") {
            Ok(s) => s.parse()?,
            Err(_) => DeliveryMode::InProcess,
        };

        let bulk_json_failure_policy = match env::var("BULK_JSON_FAILURE_POLICY") {
            Ok(s) => s.parse()?,
            Err(_) => JsonFailurePolicy::default(),
        };

        let bulk_price_policy = match env::var("BULK_PRICE_POLICY") {
            Ok(s) => s.parse()?,
            Err(_) => PricePolicy::default(),
        };

        let config = AppConfig {
            server_port,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            record_store_backend,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            notification_delivery,
            notification_max_retries: env::var("NOTIFICATION_MAX_RETRIES")
                .unwrap_or_else(|_| NOTIFICATION_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_MAX_RETRIES),
            notification_ack_deadline_secs: env::var("NOTIFICATION_ACK_DEADLINE_SECS")
                .unwrap_or_else(|_| NOTIFICATION_ACK_DEADLINE_SECS.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_ACK_DEADLINE_SECS),
            notification_max_in_flight: env::var("NOTIFICATION_MAX_IN_FLIGHT")
                .unwrap_or_else(|_| NOTIFICATION_MAX_IN_FLIGHT.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_MAX_IN_FLIGHT),
            notification_queue_capacity: env::var("NOTIFICATION_QUEUE_CAPACITY")
                .unwrap_or_else(|_| NOTIFICATION_QUEUE_CAPACITY.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_QUEUE_CAPACITY),
            bulk_consumer_concurrency: env::var("BULK_CONSUMER_CONCURRENCY")
                .unwrap_or_else(|_| BULK_CONSUMER_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(BULK_CONSUMER_CONCURRENCY),
            bulk_json_failure_policy,
            bulk_price_policy,
            http_fetch_timeout_secs: env::var("HTTP_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_FETCH_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if self.record_store_backend == RecordStoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using the postgres record store"
                    ));
                }
                Some(url)
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ));
                }
                Some(_) => {}
            }
        }

        if self.bulk_consumer_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "BULK_CONSUMER_CONCURRENCY must be greater than 0"
            ));
        }
        if self.notification_max_in_flight == 0 || self.notification_queue_capacity == 0 {
            return Err(anyhow::anyhow!(
                "NOTIFICATION_MAX_IN_FLIGHT and NOTIFICATION_QUEUE_CAPACITY must be greater than 0"
            ));
        }

        if self.log_format != "compact" && self.log_format != "json" {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config(Box::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.server_port(), 8084);
        assert_eq!(config.max_upload_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.bulk_consumer_concurrency(), 16);
        assert!(!config.is_production());
    }

    #[test]
    fn push_endpoint_joins_base_and_path() {
        let mut app = AppConfig::default();
        app.public_base_url = "https://pantry.example.com/".to_string();
        let config = Config(Box::new(app));
        assert_eq!(
            config.push_endpoint("/api/downloadcsv"),
            "https://pantry.example.com/api/downloadcsv"
        );
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut app = AppConfig {
            storage_backend: StorageBackend::S3,
            ..AppConfig::default()
        };
        assert!(app.validate().is_err());

        app.s3_bucket = Some("pantry".to_string());
        assert!(app.validate().is_err());

        app.aws_region = Some("us-east-1".to_string());
        assert!(app.validate().is_ok());
    }

    #[test]
    fn postgres_backend_requires_postgres_url() {
        let mut app = AppConfig {
            record_store_backend: RecordStoreBackend::Postgres,
            ..AppConfig::default()
        };
        assert!(app.validate().is_err());

        app.database_url = Some("mysql://localhost/pantry".to_string());
        assert!(app.validate().is_err());

        app.database_url = Some("postgres://localhost/pantry".to_string());
        assert!(app.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let app = AppConfig {
            bulk_consumer_concurrency: 0,
            ..AppConfig::default()
        };
        assert!(app.validate().is_err());
    }
}
