//! Vision analysis of a reference thumbnail
use std::sync::Arc;

use crate::error::{Result, ThumbnailError};
use crate::models::{AnalysisMode, GenerationOption};
use crate::providers::{ChatCompletion, ChatMessage, ChatRequest};

const STYLE_TEMPLATE: &str = "Study this YouTube thumbnail's visual style: colour palette, \
typography, text placement, composition, lighting, subject framing and overall mood. \
Then write one detailed image generation prompt for a NEW thumbnail in exactly that style \
for a video titled \"{title}\". The new thumbnail must show the new title as bold text. \
Reply with the prompt only.";

const RECREATE_TEMPLATE: &str = "Describe this YouTube thumbnail precisely enough that an \
image generation model could recreate it: every subject and their pose and expression, \
all visible text and its font treatment, background, colours, lighting and layout. \
Reply with the description only, written as an image generation prompt.";

pub struct ImageAnalyzer {
    chat: Arc<dyn ChatCompletion>,
    model: String,
}

impl ImageAnalyzer {
    pub fn new(chat: Arc<dyn ChatCompletion>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Prompt for a new thumbnail that borrows the reference's style
    pub async fn analyze_style(&self, reference_image_url: &str, video_title: &str) -> Result<String> {
        let instruction = STYLE_TEMPLATE.replace("{title}", video_title);
        self.ask(instruction, reference_image_url).await
    }

    /// Description precise enough to redraw the reference
    pub async fn analyze_for_recreation(&self, reference_image_url: &str) -> Result<String> {
        self.ask(RECREATE_TEMPLATE.to_string(), reference_image_url).await
    }

    pub async fn analyze(
        &self,
        mode: AnalysisMode,
        reference_image_url: &str,
        video_title: &str,
    ) -> Result<String> {
        match mode.effective_option() {
            GenerationOption::Style => self.analyze_style(reference_image_url, video_title).await,
            GenerationOption::Recreate => self.analyze_for_recreation(reference_image_url).await,
        }
    }

    async fn ask(&self, instruction: String, reference_image_url: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user_with_image(instruction, reference_image_url)],
            max_tokens: Some(1024),
            temperature: Some(0.4),
        };

        self.chat
            .complete(request)
            .await
            .map_err(|e| ThumbnailError::ImageAnalysis(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ContentPart, MessageContent};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoChat {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl ChatCompletion for EchoChat {
        async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request);
            Ok("analysis".to_string())
        }
    }

    fn instruction_of(request: &ChatRequest) -> String {
        match &request.messages[0].content {
            MessageContent::Parts(parts) => match &parts[0] {
                ContentPart::Text { text } => text.clone(),
                other => panic!("unexpected part: {:?}", other),
            },
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_style_only_ignores_recreate_request() {
        let chat = Arc::new(EchoChat::default());
        let analyzer = ImageAnalyzer::new(chat.clone(), "vision");

        analyzer
            .analyze(AnalysisMode::StyleOnly, "https://img.youtube.com/vi/x/maxresdefault.jpg", "My Video")
            .await
            .unwrap();

        let seen = chat.seen.lock().unwrap();
        let instruction = instruction_of(&seen[0]);
        assert!(instruction.contains("My Video"));
        assert!(instruction.contains("visual style"));
    }

    #[tokio::test]
    async fn test_recreate_mode_uses_recreation_template() {
        let chat = Arc::new(EchoChat::default());
        let analyzer = ImageAnalyzer::new(chat.clone(), "vision");

        analyzer
            .analyze(
                AnalysisMode::StyleOrRecreate(GenerationOption::Recreate),
                "https://img.youtube.com/vi/x/maxresdefault.jpg",
                "My Video",
            )
            .await
            .unwrap();

        let seen = chat.seen.lock().unwrap();
        assert!(instruction_of(&seen[0]).contains("recreate it"));
    }
}
