//! Configuration for thumbnail service
use serde::Deserialize;
use std::time::Duration;

use crate::models::CreditCosts;

/// Main configuration struct, loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// `production` hides error details from response bodies
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Database connection URL
    pub database_url: String,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Shared secret for the internal endpoints (provisioning, grants, stats).
    /// Internal endpoints reject every request when unset.
    #[serde(default)]
    pub internal_api_key: Option<String>,

    // ============================================
    // Chat completion (prompt enhancement, image analysis)
    // ============================================
    #[serde(default)]
    pub groq_api_key: String,

    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,

    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    // ============================================
    // Image generation
    // ============================================
    #[serde(default)]
    pub nebius_api_key: String,

    #[serde(default = "default_nebius_base_url")]
    pub nebius_base_url: String,

    #[serde(default = "default_nebius_image_model")]
    pub nebius_image_model: String,

    #[serde(default)]
    pub replicate_api_token: String,

    #[serde(default = "default_replicate_base_url")]
    pub replicate_base_url: String,

    #[serde(default = "default_replicate_model")]
    pub replicate_model: String,

    /// Budget for the primary generator before the fallback takes over
    #[serde(default = "default_primary_generation_timeout_secs")]
    pub primary_generation_timeout_secs: u64,

    /// Upper bound on polling a fallback prediction that did not finish inline
    #[serde(default = "default_replicate_poll_timeout_secs")]
    pub replicate_poll_timeout_secs: u64,

    /// Per-request timeout for every outbound HTTP call
    #[serde(default = "default_http_client_timeout_secs")]
    pub http_client_timeout_secs: u64,

    // ============================================
    // Credits
    // ============================================
    #[serde(default = "default_credit_cost_text")]
    pub credit_cost_text: i64,

    #[serde(default = "default_credit_cost_image")]
    pub credit_cost_image: i64,

    #[serde(default = "default_credit_cost_youtube")]
    pub credit_cost_youtube: i64,

    /// Credits granted once, when an account is first provisioned
    #[serde(default = "default_trial_bonus_credits")]
    pub trial_bonus_credits: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_database_max_connections() -> u32 {
    10
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_prompt_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_vision_model() -> String {
    "meta-llama/llama-4-scout-17b-16e-instruct".to_string()
}

fn default_nebius_base_url() -> String {
    "https://api.studio.nebius.com/v1".to_string()
}

fn default_nebius_image_model() -> String {
    "black-forest-labs/flux-schnell".to_string()
}

fn default_replicate_base_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_replicate_model() -> String {
    "black-forest-labs/flux-dev".to_string()
}

fn default_primary_generation_timeout_secs() -> u64 {
    30
}

fn default_replicate_poll_timeout_secs() -> u64 {
    120
}

fn default_http_client_timeout_secs() -> u64 {
    120
}

fn default_credit_cost_text() -> i64 {
    10
}

fn default_credit_cost_image() -> i64 {
    20
}

fn default_credit_cost_youtube() -> i64 {
    20
}

fn default_trial_bonus_credits() -> i64 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            app_env: default_app_env(),
            database_url: "postgres://localhost/thumbnails".to_string(),
            database_max_connections: default_database_max_connections(),
            internal_api_key: None,
            groq_api_key: String::new(),
            groq_base_url: default_groq_base_url(),
            prompt_model: default_prompt_model(),
            vision_model: default_vision_model(),
            nebius_api_key: String::new(),
            nebius_base_url: default_nebius_base_url(),
            nebius_image_model: default_nebius_image_model(),
            replicate_api_token: String::new(),
            replicate_base_url: default_replicate_base_url(),
            replicate_model: default_replicate_model(),
            primary_generation_timeout_secs: default_primary_generation_timeout_secs(),
            replicate_poll_timeout_secs: default_replicate_poll_timeout_secs(),
            http_client_timeout_secs: default_http_client_timeout_secs(),
            credit_cost_text: default_credit_cost_text(),
            credit_cost_image: default_credit_cost_image(),
            credit_cost_youtube: default_credit_cost_youtube(),
            trial_bonus_credits: default_trial_bonus_credits(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn credit_costs(&self) -> CreditCosts {
        CreditCosts {
            text: self.credit_cost_text,
            image: self.credit_cost_image,
            youtube: self.credit_cost_youtube,
        }
    }

    pub fn primary_generation_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_generation_timeout_secs)
    }

    pub fn replicate_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.replicate_poll_timeout_secs)
    }

    pub fn http_client_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout_secs)
    }

    /// Reject configurations that would break the credit invariants
    pub fn validate(&self) -> Result<(), String> {
        let costs = self.credit_costs();
        if costs.text <= 0 || costs.image <= 0 || costs.youtube <= 0 {
            return Err("credit costs must be positive".to_string());
        }
        if self.trial_bonus_credits < 0 {
            return Err("TRIAL_BONUS_CREDITS must not be negative".to_string());
        }
        if self.primary_generation_timeout_secs == 0 {
            return Err("PRIMARY_GENERATION_TIMEOUT_SECS must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pin_single_cost_table_and_timeout() {
        let config = Config::default();
        assert_eq!(config.credit_costs(), CreditCosts::default());
        assert_eq!(config.primary_generation_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_detection() {
        let mut config = Config::default();
        assert!(!config.is_production());
        config.app_env = "Production".to_string();
        assert!(config.is_production());
    }

    #[test]
    fn test_validate_rejects_zero_cost() {
        let config = Config {
            credit_cost_image: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
