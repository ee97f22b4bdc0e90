pub mod account;
pub mod generation;
pub mod request;

pub use account::{Account, CreditGrant, CreditGrantReason, NewAccount};
pub use generation::{
    AnalysisMode, AspectRatio, ChargedGeneration, CreditCosts, Dimensions, GenerationMetadata,
    GenerationOption, GenerationRecord, GenerationStats, GenerationType, NewGeneration,
    StatsRange, TypeStats,
};
pub use request::{
    extract_youtube_video_id, youtube_thumbnail_url, GenerateThumbnailPayload, GenerationInput,
    GenerationRequest,
};
