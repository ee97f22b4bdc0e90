pub mod artifact_store;
pub mod generation;
pub mod image_analyzer;
pub mod image_pipeline;
pub mod prompt_enhancer;

pub use artifact_store::{ArtifactStore, S3ArtifactStore, StoredArtifact};
pub use generation::{GenerationOutcome, ThumbnailGenerator};
pub use image_analyzer::ImageAnalyzer;
pub use image_pipeline::{GeneratedImage, ImagePipeline};
pub use prompt_enhancer::PromptEnhancer;
