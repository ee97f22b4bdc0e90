/// Shared S3 utilities
///
/// Provides the S3 client, configuration, and object operations used to make
/// generated artifacts durable. Works against AWS S3 and S3-compatible stores
/// (Supabase Storage, MinIO) through an endpoint override.

use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod operations;

pub use config::S3Config;

#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("S3 configuration error: {0}")]
    Config(String),

    #[error("S3 request failed: {0}")]
    Request(String),
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create new S3 client with configuration from environment
    pub async fn from_env() -> Result<Self, S3Error> {
        let config = S3Config::from_env().map_err(|e| S3Error::Config(e.to_string()))?;
        Ok(Self::with_config(config).await)
    }

    /// Create new S3 client with custom configuration
    pub async fn with_config(config: S3Config) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = config.endpoint.as_deref() {
            builder = builder.endpoint_url(endpoint);
        }
        builder = builder.force_path_style(config.path_style);

        tracing::info!(
            bucket = %config.bucket,
            endpoint = ?config.endpoint,
            "S3 client initialized"
        );

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Get reference to underlying AWS S3 client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get S3 configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Request(e.to_string()))?;

        Ok(())
    }
}
