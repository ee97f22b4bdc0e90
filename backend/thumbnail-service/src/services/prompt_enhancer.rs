//! Turns a raw video title into a detailed image-generation prompt
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, ThumbnailError};
use crate::providers::{ChatCompletion, ChatMessage, ChatRequest};

const SYSTEM_PROMPT: &str = "You are an expert YouTube thumbnail designer. \
Given a video title, write a single detailed prompt for an image generation model \
that produces a click-worthy thumbnail. The thumbnail must feature the title as bold, \
high-contrast text that is legible at small sizes, one expressive central figure or \
subject, and a vibrant gradient background. Pick a font treatment that suits the \
video's genre. Describe composition, lighting, colours and mood. \
Reply with the prompt only, no preamble. Keep the prompt under 6000 characters.";

const MAX_PROMPT_CHARS: usize = 6000;

pub struct PromptEnhancer {
    chat: Arc<dyn ChatCompletion>,
    model: String,
}

impl PromptEnhancer {
    pub fn new(chat: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    pub async fn enhance(&self, title: &str) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Create a thumbnail prompt for a video titled \"{}\".",
                    title
                )),
            ],
            max_tokens: Some(1500),
            temperature: Some(0.7),
        };

        let prompt = self
            .chat
            .complete(request)
            .await
            .map_err(|e| ThumbnailError::PromptEnhancement(format!("{:#}", e)))?;

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = prompt.chars().count(),
            "Prompt enhanced"
        );

        Ok(clamp_chars(prompt, MAX_PROMPT_CHARS))
    }
}

/// The model is asked to stay under the cap; this enforces it
fn clamp_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MessageContent;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingChat {
        reply: std::result::Result<String, String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl ChatCompletion for RecordingChat {
        async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[tokio::test]
    async fn test_title_is_sent_with_system_instruction() {
        let chat = Arc::new(RecordingChat {
            reply: Ok("A bold neon thumbnail".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let enhancer = PromptEnhancer::new(chat.clone(), "llama");

        let prompt = enhancer.enhance("How I Built a Rocket").await.unwrap();
        assert_eq!(prompt, "A bold neon thumbnail");

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen[0].model, "llama");
        assert_eq!(seen[0].messages[0].role, "system");
        match &seen[0].messages[1].content {
            MessageContent::Text(text) => assert!(text.contains("How I Built a Rocket")),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_provider_failure_is_fatal() {
        let chat = Arc::new(RecordingChat {
            reply: Err("503 upstream".to_string()),
            seen: Mutex::new(Vec::new()),
        });
        let enhancer = PromptEnhancer::new(chat, "llama");
        assert!(matches!(
            enhancer.enhance("title").await,
            Err(ThumbnailError::PromptEnhancement(_))
        ));
    }

    #[test]
    fn test_clamp_chars() {
        assert_eq!(clamp_chars("abcdef".to_string(), 3), "abc");
        assert_eq!(clamp_chars("ab".to_string(), 3), "ab");
        assert_eq!(clamp_chars("ééé".to_string(), 2), "éé");
    }
}
