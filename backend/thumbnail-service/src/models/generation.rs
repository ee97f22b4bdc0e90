//! Generation kinds, sizing, pricing and the durable generation record
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation kind, stored verbatim in `generations.generation_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    TextToThumbnail,
    ImageToThumbnail,
    YoutubeToThumbnail,
}

impl GenerationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationType::TextToThumbnail => "text_to_thumbnail",
            GenerationType::ImageToThumbnail => "image_to_thumbnail",
            GenerationType::YoutubeToThumbnail => "youtube_to_thumbnail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text_to_thumbnail" => Some(GenerationType::TextToThumbnail),
            "image_to_thumbnail" => Some(GenerationType::ImageToThumbnail),
            "youtube_to_thumbnail" => Some(GenerationType::YoutubeToThumbnail),
            _ => None,
        }
    }
}

/// Credits charged per generation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditCosts {
    pub text: i64,
    pub image: i64,
    pub youtube: i64,
}

impl Default for CreditCosts {
    fn default() -> Self {
        Self {
            text: 10,
            image: 20,
            youtube: 20,
        }
    }
}

impl CreditCosts {
    pub fn cost_for(&self, generation_type: GenerationType) -> i64 {
        match generation_type {
            GenerationType::TextToThumbnail => self.text,
            GenerationType::ImageToThumbnail => self.image,
            GenerationType::YoutubeToThumbnail => self.youtube,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const SUPPORTED: [&'static str; 4] = ["16:9", "9:16", "1:1", "4:5"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "4:5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "16:9" => Some(AspectRatio::Landscape),
            "9:16" => Some(AspectRatio::Portrait),
            "1:1" => Some(AspectRatio::Square),
            "4:5" => Some(AspectRatio::Vertical),
            _ => None,
        }
    }

    /// Pixel size requested from the primary generator
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = match self {
            AspectRatio::Landscape => (1280, 720),
            AspectRatio::Portrait => (720, 1280),
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Vertical => (1024, 1280),
        };
        Dimensions { width, height }
    }
}

/// What the caller asked the image analyzer to do with a YouTube thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationOption {
    #[default]
    Style,
    Recreate,
}

impl GenerationOption {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "style" => Some(GenerationOption::Style),
            "recreate" => Some(GenerationOption::Recreate),
            _ => None,
        }
    }
}

/// How the YouTube reference is analyzed.
///
/// A user photo forces `StyleOnly`: the photo supplies the subject, so only
/// the reference thumbnail's style is borrowed and the requested option is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    StyleOnly,
    StyleOrRecreate(GenerationOption),
}

impl AnalysisMode {
    pub fn resolve(requested: GenerationOption, has_user_photo: bool) -> Self {
        if has_user_photo {
            AnalysisMode::StyleOnly
        } else {
            AnalysisMode::StyleOrRecreate(requested)
        }
    }

    pub fn effective_option(&self) -> GenerationOption {
        match self {
            AnalysisMode::StyleOnly => GenerationOption::Style,
            AnalysisMode::StyleOrRecreate(option) => *option,
        }
    }
}

/// Stored as JSONB next to the record and echoed in the API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub aspect_ratio: AspectRatio,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_option: Option<GenerationOption>,
    pub provider: String,
    pub used_fallback: bool,
}

/// A generation ready to be recorded and charged
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub account_id: Uuid,
    pub generation_type: GenerationType,
    pub output_image_url: String,
    pub credit_cost: i64,
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub generation_type: GenerationType,
    pub output_image_url: String,
    pub credit_cost: i64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Record plus the balance left after its charge
#[derive(Debug, Clone)]
pub struct ChargedGeneration {
    pub record: GenerationRecord,
    pub remaining_credits: i64,
}

/// Optional `created_at` window for analytics
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StatsRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub generation_type: GenerationType,
    pub generations: i64,
    pub credits_charged: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub by_type: Vec<TypeStats>,
    pub total_generations: i64,
    pub total_credits_charged: i64,
    pub total_accounts: i64,
    pub outstanding_credits: i64,
}
