//! Thumbnail generation workflow
//!
//! validate → credit check → prompt → image (primary, then fallback) →
//! durable artifact → record + charge. Nothing is charged unless a durable
//! artifact exists, and nothing is recorded unless the charge succeeds.
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::artifact_store::ArtifactStore;
use super::image_analyzer::ImageAnalyzer;
use super::image_pipeline::ImagePipeline;
use super::prompt_enhancer::PromptEnhancer;
use crate::db::{CreditLedger, GenerationStore};
use crate::error::{Result, ThumbnailError};
use crate::models::{
    youtube_thumbnail_url, CreditCosts, GenerationInput, GenerationMetadata, GenerationOption,
    GenerationRequest, NewGeneration,
};
use crate::providers::ImageGenerationRequest;

/// What a successful generation hands back to the caller
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub generation_id: Uuid,
    pub image_url: String,
    pub metadata: GenerationMetadata,
    pub credits_charged: i64,
    pub remaining_credits: i64,
}

/// Prompt and conditioning image for one request
struct PreparedPrompt {
    prompt: String,
    reference_image: Option<Url>,
    youtube_url: Option<String>,
    video_id: Option<String>,
    generation_option: Option<GenerationOption>,
}

pub struct ThumbnailGenerator {
    ledger: Arc<dyn CreditLedger>,
    generations: Arc<dyn GenerationStore>,
    enhancer: PromptEnhancer,
    analyzer: ImageAnalyzer,
    images: ImagePipeline,
    artifacts: Arc<dyn ArtifactStore>,
    costs: CreditCosts,
}

impl ThumbnailGenerator {
    pub fn new(
        ledger: Arc<dyn CreditLedger>,
        generations: Arc<dyn GenerationStore>,
        enhancer: PromptEnhancer,
        analyzer: ImageAnalyzer,
        images: ImagePipeline,
        artifacts: Arc<dyn ArtifactStore>,
        costs: CreditCosts,
    ) -> Self {
        Self {
            ledger,
            generations,
            enhancer,
            analyzer,
            images,
            artifacts,
            costs,
        }
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let start = Instant::now();
        let account_id = request.account_id;
        let generation_type = request.generation_type();
        let cost = self.costs.cost_for(generation_type);

        if !self.ledger.check_sufficient_credits(account_id, cost).await? {
            return Err(ThumbnailError::InsufficientCredits { required: cost });
        }

        info!(
            account_id = %account_id,
            generation_type = generation_type.as_str(),
            aspect_ratio = request.aspect_ratio.as_str(),
            cost,
            "Starting thumbnail generation"
        );

        let prepared = self.prepare_prompt(request.input).await?;
        let dimensions = request.aspect_ratio.dimensions();

        let image = self
            .images
            .generate(&ImageGenerationRequest {
                prompt: prepared.prompt,
                dimensions,
                reference_image: prepared.reference_image,
            })
            .await?;

        let artifact = self.artifacts.persist(&image.url, account_id).await?;

        let metadata = GenerationMetadata {
            aspect_ratio: request.aspect_ratio,
            width: dimensions.width,
            height: dimensions.height,
            youtube_url: prepared.youtube_url,
            video_id: prepared.video_id,
            generation_option: prepared.generation_option,
            provider: image.provider.to_string(),
            used_fallback: image.used_fallback(),
        };

        let charged = match self
            .generations
            .record_and_charge(NewGeneration {
                account_id,
                generation_type,
                output_image_url: artifact.url.clone(),
                credit_cost: cost,
                metadata: metadata.clone(),
            })
            .await
        {
            Ok(charged) => charged,
            Err(err) => {
                // Unrecorded artifacts are never billed; drop the object
                if let Err(discard_err) = self.artifacts.discard(&artifact).await {
                    warn!(key = %artifact.key, error = %discard_err, "Failed to discard orphaned artifact");
                }
                return Err(err);
            }
        };

        info!(
            account_id = %account_id,
            generation_id = %charged.record.id,
            generation_type = generation_type.as_str(),
            provider = image.provider,
            used_fallback = image.used_fallback(),
            primary_error = image.primary_error.as_deref(),
            remaining_credits = charged.remaining_credits,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Thumbnail generation completed"
        );

        Ok(GenerationOutcome {
            generation_id: charged.record.id,
            image_url: artifact.url,
            metadata,
            credits_charged: cost,
            remaining_credits: charged.remaining_credits,
        })
    }

    async fn prepare_prompt(&self, input: GenerationInput) -> Result<PreparedPrompt> {
        match input {
            GenerationInput::Text { title } => Ok(PreparedPrompt {
                prompt: self.enhancer.enhance(&title).await?,
                reference_image: None,
                youtube_url: None,
                video_id: None,
                generation_option: None,
            }),
            GenerationInput::Image {
                image_text,
                reference_image_url,
            } => Ok(PreparedPrompt {
                prompt: image_text,
                reference_image: reference_image_url,
                youtube_url: None,
                video_id: None,
                generation_option: None,
            }),
            GenerationInput::Youtube {
                source_url,
                video_id,
                video_title,
                analysis_mode,
                user_photo_url,
            } => {
                let thumbnail = youtube_thumbnail_url(&video_id);
                let prompt = self
                    .analyzer
                    .analyze(analysis_mode, &thumbnail, &video_title)
                    .await?;

                let reference_image = match user_photo_url {
                    Some(photo) => photo,
                    None => Url::parse(&thumbnail).map_err(|e| {
                        ThumbnailError::Internal(format!("thumbnail URL {}: {}", thumbnail, e))
                    })?,
                };

                Ok(PreparedPrompt {
                    prompt,
                    reference_image: Some(reference_image),
                    youtube_url: Some(source_url),
                    video_id: Some(video_id),
                    generation_option: Some(analysis_mode.effective_option()),
                })
            }
        }
    }
}
