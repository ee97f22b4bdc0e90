//! Hosted AI provider clients
//!
//! Two seams: `ChatCompletion` for OpenAI-compatible chat (text and vision)
//! and `ImageGenerator` for diffusion endpoints that return an image URL.

pub mod nebius;
pub mod openai_chat;
pub mod replicate;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::models::Dimensions;

pub use nebius::NebiusImageGenerator;
pub use openai_chat::OpenAiChatClient;
pub use replicate::ReplicateImageGenerator;

// ============================================
// Chat completion
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// User turn carrying an instruction and one image
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Text of the first choice
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String>;
}

// ============================================
// Image generation
// ============================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub dimensions: Dimensions,
    /// Conditioning image, when the generation is based on a reference
    pub reference_image: Option<Url>,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the provider-hosted URL of the generated image
    async fn generate(&self, request: &ImageGenerationRequest) -> anyhow::Result<String>;
}

/// Shorten a provider error body for logs and error messages
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
