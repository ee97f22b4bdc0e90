//! Primary generator under a deadline, fallback generator at most once
use resilience::{with_fallback, Attempt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Result, ThumbnailError};
use crate::providers::{ImageGenerationRequest, ImageGenerator};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// Provider-hosted URL; transient until persisted
    pub url: String,
    pub provider: &'static str,
    pub attempt: Attempt,
    pub primary_error: Option<String>,
}

impl GeneratedImage {
    pub fn used_fallback(&self) -> bool {
        self.attempt == Attempt::Fallback
    }
}

pub struct ImagePipeline {
    primary: Arc<dyn ImageGenerator>,
    fallback: Arc<dyn ImageGenerator>,
    primary_timeout: Duration,
}

impl ImagePipeline {
    pub fn new(
        primary: Arc<dyn ImageGenerator>,
        fallback: Arc<dyn ImageGenerator>,
        primary_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            primary_timeout,
        }
    }

    pub async fn generate(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        let outcome = with_fallback(
            self.primary_timeout,
            || self.primary.generate(request),
            || self.fallback.generate(request),
        )
        .await
        .map_err(|e| {
            warn!(
                primary = self.primary.name(),
                fallback = self.fallback.name(),
                error = %e,
                "Both image generators failed"
            );
            ThumbnailError::ImageGeneration(format!("{:#}", e))
        })?;

        let provider = match outcome.attempt {
            Attempt::Primary => self.primary.name(),
            Attempt::Fallback => self.fallback.name(),
        };
        info!(
            provider,
            used_fallback = outcome.used_fallback(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Image generated"
        );

        Ok(GeneratedImage {
            url: outcome.value,
            provider,
            attempt: outcome.attempt,
            primary_error: outcome.primary_error,
        })
    }
}
