/// S3 configuration, read from `S3_*` environment variables
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Region (S3-compatible stores usually accept any value)
    #[serde(default = "default_region")]
    pub region: String,
    /// Base URL objects are publicly served from, without trailing slash
    pub public_base_url: String,
    /// Endpoint override for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    #[serde(default)]
    pub path_style: bool,
}

fn default_bucket() -> String {
    "thumbnails".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl S3Config {
    /// Load from `S3_BUCKET`, `S3_REGION`, `S3_PUBLIC_BASE_URL`, `S3_ENDPOINT`, `S3_PATH_STYLE`
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("S3_").from_env()
    }

    /// Public URL an object key is served from
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}
