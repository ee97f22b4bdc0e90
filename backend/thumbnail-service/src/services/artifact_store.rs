//! Copies provider images into our own object storage
use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use s3_utils::S3Client;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Result, ThumbnailError};

/// Upper bound on a downloaded provider image
pub const MAX_ARTIFACT_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub key: String,
    /// Durable public URL served from the artifact store's domain
    pub url: String,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Download `source_url` and store it under the owner's prefix
    async fn persist(&self, source_url: &str, owner_id: Uuid) -> Result<StoredArtifact>;

    /// Remove an artifact that ended up unreferenced
    async fn discard(&self, artifact: &StoredArtifact) -> Result<()>;
}

pub struct S3ArtifactStore {
    http: Client,
    s3: Arc<S3Client>,
}

impl S3ArtifactStore {
    pub fn new(http: Client, s3: Arc<S3Client>) -> Self {
        Self { http, s3 }
    }

    async fn download(&self, source_url: &str) -> Result<(Vec<u8>, String)> {
        let mut response = self
            .http
            .get(source_url)
            .send()
            .await
            .map_err(|e| ThumbnailError::ArtifactPersist(format!("download {}: {}", source_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbnailError::ArtifactPersist(format!(
                "download {} returned {}",
                source_url, status
            )));
        }

        let rejected = |e: String| ThumbnailError::ArtifactPersist(format!("download {}: {}", source_url, e));

        let content_type = image_content_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        )
        .map_err(rejected)?;

        if let Some(length) = response.content_length() {
            check_size(length).map_err(rejected)?;
        }

        // Content-Length is optional; the cap also applies to the streamed body
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ThumbnailError::ArtifactPersist(format!("read body {}: {}", source_url, e)))?
        {
            body.extend_from_slice(&chunk);
            check_size(body.len() as u64).map_err(rejected)?;
        }

        if body.is_empty() {
            return Err(ThumbnailError::ArtifactPersist(format!(
                "download {} returned an empty body",
                source_url
            )));
        }

        Ok((body, content_type))
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn persist(&self, source_url: &str, owner_id: Uuid) -> Result<StoredArtifact> {
        let (body, content_type) = self.download(source_url).await?;
        let key = artifact_key(owner_id, extension_for(&content_type));
        let size = body.len();

        let url = self
            .s3
            .upload_file(&key, body, &content_type)
            .await
            .map_err(|e| ThumbnailError::ArtifactPersist(e.to_string()))?;

        tracing::info!(owner_id = %owner_id, key = %key, size, "Artifact stored");
        Ok(StoredArtifact { key, url })
    }

    async fn discard(&self, artifact: &StoredArtifact) -> Result<()> {
        self.s3
            .delete_file(&artifact.key)
            .await
            .map_err(|e| ThumbnailError::ArtifactPersist(e.to_string()))
    }
}

/// `thumbnails/{owner}/{unix_millis}-{16 alphanumerics}.{ext}`
pub fn artifact_key(owner_id: Uuid, extension: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!(
        "thumbnails/{}/{}-{}.{}",
        owner_id,
        Utc::now().timestamp_millis(),
        token,
        extension
    )
}

/// Normalised `image/*` media type; a missing header is taken as PNG
fn image_content_type(header: Option<&str>) -> std::result::Result<String, String> {
    let Some(raw) = header else {
        return Ok("image/png".to_string());
    };
    let media_type = raw.split(';').next().unwrap_or(raw).trim().to_ascii_lowercase();
    if media_type.starts_with("image/") {
        Ok(media_type)
    } else {
        Err(format!("unexpected content type {}", media_type))
    }
}

fn check_size(bytes: u64) -> std::result::Result<(), String> {
    if bytes > MAX_ARTIFACT_BYTES {
        Err(format!(
            "body of {} bytes exceeds the {} byte limit",
            bytes, MAX_ARTIFACT_BYTES
        ))
    } else {
        Ok(())
    }
}

pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}
