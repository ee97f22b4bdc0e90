use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use super::HandlerResult;
use crate::models::{GenerateThumbnailPayload, GenerationMetadata, GenerationRequest};
use crate::services::GenerationOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateThumbnailResponse {
    pub success: bool,
    pub images: Vec<String>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(flatten)]
    pub generation: GenerationMetadata,
    pub generation_id: Uuid,
    pub credits_charged: i64,
    pub remaining_credits: i64,
}

impl From<GenerationOutcome> for GenerateThumbnailResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            success: true,
            images: vec![outcome.image_url],
            metadata: ResponseMetadata {
                generation: outcome.metadata,
                generation_id: outcome.generation_id,
                credits_charged: outcome.credits_charged,
                remaining_credits: outcome.remaining_credits,
            },
        }
    }
}

/// POST /generate-thumbnail
pub async fn generate_thumbnail(
    state: web::Data<AppState>,
    payload: web::Json<GenerateThumbnailPayload>,
) -> HandlerResult {
    let request =
        GenerationRequest::try_from_payload(payload.into_inner()).map_err(|e| state.reject(e))?;

    let outcome = state
        .generator
        .generate(request)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(HttpResponse::Ok().json(GenerateThumbnailResponse::from(outcome)))
}
