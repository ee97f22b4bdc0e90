//! Fallback diffusion endpoint: Replicate model predictions
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{truncate_body, ImageGenerationRequest, ImageGenerator};
use crate::models::Dimensions;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct ReplicateImageGenerator {
    client: Client,
    base_url: String,
    api_token: String,
    model: String,
    poll_timeout: Duration,
}

/// The fallback model takes ratio labels, not pixel sizes
pub fn fallback_aspect_ratio(dimensions: Dimensions) -> &'static str {
    if dimensions.width >= dimensions.height {
        "16:9"
    } else {
        "9:16"
    }
}

impl ReplicateImageGenerator {
    pub fn new(
        client: Client,
        base_url: &str,
        api_token: &str,
        model: &str,
        poll_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            model: model.to_string(),
            poll_timeout,
        }
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/models/{}/predictions", self.base_url, self.model)
    }

    fn build_input(request: &ImageGenerationRequest) -> Value {
        let mut input = json!({
            "prompt": request.prompt,
            "aspect_ratio": fallback_aspect_ratio(request.dimensions),
            "num_outputs": 1,
            "output_format": "png",
        });
        if let (Some(reference), Some(obj)) = (&request.reference_image, input.as_object_mut()) {
            obj.insert("image".to_string(), Value::String(reference.to_string()));
        }
        input
    }

    async fn response_json(label: &str, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{} returned {}: {}", label, status, truncate_body(&body));
        }
        response
            .json::<Value>()
            .await
            .with_context(|| format!("failed to parse {} response", label))
    }

    async fn poll_prediction(&self, poll_url: &str) -> Result<Value> {
        let started = Instant::now();
        loop {
            let response = self
                .client
                .get(poll_url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .with_context(|| format!("Replicate poll request failed ({})", poll_url))?;
            let prediction = Self::response_json("Replicate poll", response).await?;

            match prediction_status(&prediction).as_str() {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => bail!(
                    "Replicate prediction {}: {}",
                    prediction_status(&prediction),
                    prediction_error(&prediction)
                ),
                _ => {}
            }

            if started.elapsed() >= self.poll_timeout {
                bail!(
                    "Replicate polling timed out after {}s",
                    self.poll_timeout.as_secs()
                );
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

fn prediction_status(prediction: &Value) -> String {
    prediction
        .get("status")
        .and_then(Value::as_str)
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default()
}

fn prediction_error(prediction: &Value) -> String {
    prediction
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("no error detail")
        .to_string()
}

/// Collect image URLs from a prediction output: a single URL, an array of
/// URLs, or objects carrying `url`/`urls`
pub fn extract_output_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(url) => {
            let trimmed = url.trim();
            if trimmed.starts_with("http") && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(rows) => {
            for row in rows {
                extract_output_urls(row, out);
            }
        }
        Value::Object(obj) => {
            if let Some(url) = obj.get("url") {
                extract_output_urls(url, out);
            }
            if let Some(urls) = obj.get("urls") {
                extract_output_urls(urls, out);
            }
        }
        _ => {}
    }
}

#[async_trait]
impl ImageGenerator for ReplicateImageGenerator {
    fn name(&self) -> &'static str {
        "replicate"
    }

    async fn generate(&self, request: &ImageGenerationRequest) -> Result<String> {
        let input = Self::build_input(request);
        debug!(model = %self.model, aspect_ratio = %input["aspect_ratio"], "Requesting fallback image generation");

        let response = self
            .client
            .post(self.predictions_endpoint())
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&json!({ "input": input }))
            .send()
            .await
            .context("Replicate prediction request failed")?;
        let mut prediction = Self::response_json("Replicate", response).await?;

        match prediction_status(&prediction).as_str() {
            "succeeded" => {}
            "starting" | "processing" => {
                let poll_url = prediction
                    .get("urls")
                    .and_then(|urls| urls.get("get"))
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .ok_or_else(|| anyhow!("Replicate prediction missing poll URL"))?
                    .to_string();
                info!(poll_url = %poll_url, "Replicate prediction still running, polling");
                prediction = self.poll_prediction(&poll_url).await?;
            }
            other => bail!(
                "Replicate prediction {}: {}",
                if other.is_empty() { "has no status" } else { other },
                prediction_error(&prediction)
            ),
        }

        let mut urls = Vec::new();
        if let Some(output) = prediction.get("output") {
            extract_output_urls(output, &mut urls);
        }
        urls.into_iter()
            .next()
            .ok_or_else(|| anyhow!("Replicate prediction returned no image URLs"))
    }
}
