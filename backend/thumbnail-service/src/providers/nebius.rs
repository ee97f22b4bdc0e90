//! Primary diffusion endpoint: OpenAI-style `/images/generations`
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{truncate_body, ImageGenerationRequest, ImageGenerator};

pub struct NebiusImageGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl NebiusImageGenerator {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }
}

#[async_trait]
impl ImageGenerator for NebiusImageGenerator {
    fn name(&self) -> &'static str {
        "nebius"
    }

    async fn generate(&self, request: &ImageGenerationRequest) -> Result<String> {
        let body = GenerationBody {
            model: &self.model,
            prompt: &request.prompt,
            width: request.dimensions.width,
            height: request.dimensions.height,
            response_format: "url",
            image: request.reference_image.as_ref().map(|url| url.as_str()),
        };

        debug!(
            model = %self.model,
            width = body.width,
            height = body.height,
            conditioned = body.image.is_some(),
            "Requesting primary image generation"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Nebius image request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Nebius returned {}: {}", status, truncate_body(&text));
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .context("failed to parse Nebius response")?;

        parsed
            .data
            .into_iter()
            .find_map(|image| image.url.filter(|url| !url.trim().is_empty()))
            .ok_or_else(|| anyhow::anyhow!("Nebius response contained no image URL"))
    }
}
