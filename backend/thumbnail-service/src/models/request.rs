//! Inbound generation request: wire payload and its validated form

use serde::Deserialize;
use url::Url;
use uuid::Uuid;
use validator::Validate;

use super::generation::{AnalysisMode, AspectRatio, GenerationOption, GenerationType};
use crate::error::{Result, ThumbnailError};

const YOUTUBE_ID_LEN: usize = 11;

/// `POST /generate-thumbnail` body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateThumbnailPayload {
    pub user_id: Option<Uuid>,
    pub generation_type: Option<String>,
    #[validate(length(max = 300, message = "title must be at most 300 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "imageText must be at most 2000 characters"))]
    pub image_text: Option<String>,
    pub youtube_url: Option<String>,
    #[validate(length(max = 300, message = "videoTitle must be at most 300 characters"))]
    pub video_title: Option<String>,
    #[validate(url(message = "referenceImageUrl must be a valid URL"))]
    pub reference_image_url: Option<String>,
    pub aspect_ratio: Option<String>,
    pub generation_option: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationInput {
    Text {
        title: String,
    },
    Image {
        image_text: String,
        reference_image_url: Option<Url>,
    },
    Youtube {
        source_url: String,
        video_id: String,
        video_title: String,
        analysis_mode: AnalysisMode,
        user_photo_url: Option<Url>,
    },
}

/// A request that passed every check that does not need the outside world
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub account_id: Uuid,
    pub aspect_ratio: AspectRatio,
    pub input: GenerationInput,
}

impl GenerationRequest {
    pub fn try_from_payload(payload: GenerateThumbnailPayload) -> Result<Self> {
        payload.validate()?;

        let account_id = payload
            .user_id
            .ok_or_else(|| ThumbnailError::Validation("userId is required".to_string()))?;

        let generation_type = payload
            .generation_type
            .as_deref()
            .map(|raw| {
                GenerationType::parse(raw).ok_or_else(|| {
                    ThumbnailError::Validation(format!("unsupported generationType: {}", raw))
                })
            })
            .transpose()?
            .ok_or_else(|| ThumbnailError::Validation("generationType is required".to_string()))?;

        let aspect_ratio = match payload.aspect_ratio.as_deref() {
            None => {
                return Err(ThumbnailError::Validation(
                    "aspectRatio is required".to_string(),
                ))
            }
            Some(raw) => AspectRatio::parse(raw).ok_or_else(|| {
                ThumbnailError::Validation(format!(
                    "unsupported aspectRatio: {} (expected one of {})",
                    raw,
                    AspectRatio::SUPPORTED.join(", ")
                ))
            })?,
        };

        let reference_image_url = payload
            .reference_image_url
            .as_deref()
            .map(parse_http_url)
            .transpose()?;

        let input = match generation_type {
            GenerationType::TextToThumbnail => GenerationInput::Text {
                title: required(payload.title, "title")?,
            },
            GenerationType::ImageToThumbnail => GenerationInput::Image {
                image_text: required(payload.image_text, "imageText")?,
                reference_image_url,
            },
            GenerationType::YoutubeToThumbnail => {
                let source_url = required(payload.youtube_url, "youtubeUrl")?;
                let video_id = extract_youtube_video_id(&source_url).ok_or_else(|| {
                    ThumbnailError::Validation(format!("not a valid YouTube URL: {}", source_url))
                })?;
                let video_title = required(payload.video_title, "videoTitle")?;
                let requested = match payload.generation_option.as_deref() {
                    None => GenerationOption::default(),
                    Some(raw) => GenerationOption::parse(raw).ok_or_else(|| {
                        ThumbnailError::Validation(format!(
                            "unsupported generationOption: {} (expected style or recreate)",
                            raw
                        ))
                    })?,
                };

                GenerationInput::Youtube {
                    source_url,
                    video_id,
                    video_title,
                    analysis_mode: AnalysisMode::resolve(requested, reference_image_url.is_some()),
                    user_photo_url: reference_image_url,
                }
            }
        };

        Ok(Self {
            account_id,
            aspect_ratio,
            input,
        })
    }

    pub fn generation_type(&self) -> GenerationType {
        match self.input {
            GenerationInput::Text { .. } => GenerationType::TextToThumbnail,
            GenerationInput::Image { .. } => GenerationType::ImageToThumbnail,
            GenerationInput::Youtube { .. } => GenerationType::YoutubeToThumbnail,
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ThumbnailError::Validation(format!("{} is required", field))),
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ThumbnailError::Validation(format!("invalid URL {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ThumbnailError::Validation(format!(
            "unsupported URL scheme: {}",
            other
        ))),
    }
}

/// Extract the 11-character video id from the URL shapes YouTube hands out:
/// `youtu.be/{id}`, `watch?v={id}`, `embed/{id}`, `shorts/{id}`, `live/{id}`.
pub fn extract_youtube_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("live") | Some("v") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == YOUTUBE_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Highest-resolution still YouTube serves for a video
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn youtube_payload(url: &str) -> GenerateThumbnailPayload {
        GenerateThumbnailPayload {
            user_id: Some(Uuid::new_v4()),
            generation_type: Some("youtube_to_thumbnail".to_string()),
            youtube_url: Some(url.to_string()),
            video_title: Some("I tried every keyboard".to_string()),
            aspect_ratio: Some("16:9".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_extracts_id_from_every_url_shape() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
        ] {
            assert_eq!(
                extract_youtube_video_id(url).as_deref(),
                Some("dQw4w9WgXcQ"),
                "{}",
                url
            );
        }
    }

    #[test]
    fn test_rejects_non_youtube_urls() {
        assert!(extract_youtube_video_id("https://example.com/not-youtube").is_none());
        assert!(extract_youtube_video_id("https://www.youtube.com/watch?v=short").is_none());
        assert!(extract_youtube_video_id("not a url").is_none());
    }

    #[test]
    fn test_thumbnail_url() {
        assert_eq!(
            youtube_thumbnail_url("dQw4w9WgXcQ"),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }

    #[test]
    fn test_text_request_trims_title() {
        let payload = GenerateThumbnailPayload {
            user_id: Some(Uuid::new_v4()),
            generation_type: Some("text_to_thumbnail".to_string()),
            title: Some("  How I Built a Rocket  ".to_string()),
            aspect_ratio: Some("9:16".to_string()),
            ..Default::default()
        };
        let request = GenerationRequest::try_from_payload(payload).unwrap();
        assert_eq!(request.aspect_ratio, AspectRatio::Portrait);
        assert_eq!(
            request.input,
            GenerationInput::Text {
                title: "How I Built a Rocket".to_string()
            }
        );
    }

    #[test]
    fn test_missing_aspect_ratio_is_validation_error() {
        let payload = GenerateThumbnailPayload {
            user_id: Some(Uuid::new_v4()),
            generation_type: Some("text_to_thumbnail".to_string()),
            title: Some("How I Built a Rocket".to_string()),
            ..Default::default()
        };
        match GenerationRequest::try_from_payload(payload) {
            Err(ThumbnailError::Validation(message)) => assert!(message.contains("aspectRatio")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_title_is_validation_error() {
        let payload = GenerateThumbnailPayload {
            user_id: Some(Uuid::new_v4()),
            generation_type: Some("text_to_thumbnail".to_string()),
            title: Some("   ".to_string()),
            aspect_ratio: Some("16:9".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            GenerationRequest::try_from_payload(payload),
            Err(ThumbnailError::Validation(_))
        ));
    }

    #[test]
    fn test_unsupported_aspect_ratio_is_validation_error() {
        let payload = GenerateThumbnailPayload {
            aspect_ratio: Some("21:9".to_string()),
            ..youtube_payload("https://youtu.be/dQw4w9WgXcQ")
        };
        assert!(matches!(
            GenerationRequest::try_from_payload(payload),
            Err(ThumbnailError::Validation(_))
        ));
    }

    #[test]
    fn test_youtube_request_with_photo_forces_style() {
        let payload = GenerateThumbnailPayload {
            reference_image_url: Some("https://cdn.example.com/me.png".to_string()),
            generation_option: Some("recreate".to_string()),
            ..youtube_payload("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        };
        let request = GenerationRequest::try_from_payload(payload).unwrap();
        match request.input {
            GenerationInput::Youtube {
                video_id,
                analysis_mode,
                user_photo_url,
                ..
            } => {
                assert_eq!(video_id, "dQw4w9WgXcQ");
                assert_eq!(analysis_mode, AnalysisMode::StyleOnly);
                assert!(user_photo_url.is_some());
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[test]
    fn test_youtube_request_without_title_rejected() {
        let payload = GenerateThumbnailPayload {
            video_title: None,
            ..youtube_payload("https://youtu.be/dQw4w9WgXcQ")
        };
        assert!(GenerationRequest::try_from_payload(payload).is_err());
    }

    #[test]
    fn test_malformed_reference_url_rejected() {
        let payload = GenerateThumbnailPayload {
            user_id: Some(Uuid::new_v4()),
            generation_type: Some("image_to_thumbnail".to_string()),
            image_text: Some("A cat astronaut".to_string()),
            reference_image_url: Some("ftp://files.example.com/cat.png".to_string()),
            aspect_ratio: Some("1:1".to_string()),
            ..Default::default()
        };
        assert!(GenerationRequest::try_from_payload(payload).is_err());
    }
}
