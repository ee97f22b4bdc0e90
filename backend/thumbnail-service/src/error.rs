/// Error types for thumbnail-service
///
/// `ThumbnailError` is what every layer returns. The HTTP layer wraps it in
/// `ApiError`, which decides how much of the message reaches the client.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

/// Result type for thumbnail-service operations
pub type Result<T> = std::result::Result<T, ThumbnailError>;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient credits: {required} required")]
    InsufficientCredits { required: i64 },

    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Prompt enhancement failed: {0}")]
    PromptEnhancement(String),

    #[error("Image analysis failed: {0}")]
    ImageAnalysis(String),

    #[error("Image generation failed: {0}")]
    ImageGeneration(String),

    #[error("Failed to persist generated image: {0}")]
    ArtifactPersist(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThumbnailError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ThumbnailError::Validation(_)
            | ThumbnailError::InsufficientCredits { .. }
            | ThumbnailError::AccountNotFound(_) => StatusCode::BAD_REQUEST,
            ThumbnailError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ThumbnailError::PromptEnhancement(_)
            | ThumbnailError::ImageAnalysis(_)
            | ThumbnailError::ImageGeneration(_)
            | ThumbnailError::ArtifactPersist(_)
            | ThumbnailError::Database(_)
            | ThumbnailError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ThumbnailError::Validation(_) => "VALIDATION_ERROR",
            ThumbnailError::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            ThumbnailError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            ThumbnailError::Unauthorized(_) => "UNAUTHORIZED",
            ThumbnailError::PromptEnhancement(_) => "PROMPT_ENHANCEMENT_FAILED",
            ThumbnailError::ImageAnalysis(_) => "IMAGE_ANALYSIS_FAILED",
            ThumbnailError::ImageGeneration(_) => "IMAGE_GENERATION_FAILED",
            ThumbnailError::ArtifactPersist(_) => "ARTIFACT_PERSIST_FAILED",
            ThumbnailError::Database(_) => "DATABASE_ERROR",
            ThumbnailError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show any caller
    fn public_message(&self) -> String {
        match self {
            ThumbnailError::Validation(msg) => msg.clone(),
            ThumbnailError::InsufficientCredits { required } => {
                format!("Insufficient credits: this generation costs {} credits", required)
            }
            ThumbnailError::AccountNotFound(_) => "Account not found".to_string(),
            ThumbnailError::Unauthorized(_) => "Unauthorized".to_string(),
            ThumbnailError::PromptEnhancement(_) => "Failed to enhance prompt".to_string(),
            ThumbnailError::ImageAnalysis(_) => "Failed to analyze reference image".to_string(),
            ThumbnailError::ImageGeneration(_) => "Failed to generate thumbnail".to_string(),
            ThumbnailError::ArtifactPersist(_) => "Failed to store generated thumbnail".to_string(),
            ThumbnailError::Database(_) | ThumbnailError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<validator::ValidationErrors> for ThumbnailError {
    fn from(err: validator::ValidationErrors) -> Self {
        ThumbnailError::Validation(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// HTTP-facing error; `expose_details` is false in production
#[derive(Debug)]
pub struct ApiError {
    pub error: ThumbnailError,
    pub expose_details: bool,
}

impl ApiError {
    pub fn new(error: ThumbnailError, expose_details: bool) -> Self {
        Self {
            error,
            expose_details,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.error.public_message(),
            code: self.error.code(),
            details: self.expose_details.then(|| self.error.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error.code(), error = %self.error, "Request failed");
        } else {
            tracing::warn!(code = self.error.code(), error = %self.error, "Request rejected");
        }

        HttpResponse::build(status).json(self.body())
    }
}
