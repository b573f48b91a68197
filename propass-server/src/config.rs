//! Environment-based configuration.
//!
//! Secrets never travel through CLI flags; everything sensitive comes
//! from environment variables, loaded once at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Payment provider secret API key.
    pub stripe_secret_key: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
    /// Redis REST endpoint URL; unset means `--memory-store` only.
    pub kv_url: Option<String>,
    /// Redis REST bearer token.
    pub kv_token: Option<String>,
    /// Email provider API key; unset disables real delivery.
    pub email_api_key: Option<String>,
    /// Email provider API base URL.
    pub email_api_base_url: String,
    /// From address for activation emails.
    pub email_from: String,
    /// Client app base URL; activation links point here.
    pub app_base_url: String,
}

impl Config {
    /// Loads configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stripe_secret_key: require("STRIPE_SECRET_KEY")?,
            webhook_secret: require("STRIPE_WEBHOOK_SECRET")?,
            kv_url: std::env::var("KV_REST_API_URL").ok(),
            kv_token: std::env::var("KV_REST_API_TOKEN").ok(),
            email_api_key: std::env::var("EMAIL_API_KEY").ok(),
            email_api_base_url: std::env::var("EMAIL_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.resend.com".to_string()),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "ProPass <activate@propass.app>".to_string()),
            app_base_url: require("APP_BASE_URL")?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
