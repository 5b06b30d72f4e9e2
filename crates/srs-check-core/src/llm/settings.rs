use anyhow::{Context, Result};
use std::{collections::HashMap, time::Duration};

use super::retry::RetryPolicy;

/// Environment-driven configuration for the validation oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub provider: String,
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl LlmSettings {
    pub const PROVIDER_ENV: &'static str = "SRS_CHECK_PROVIDER";
    pub const API_KEY_ENV: &'static str = "SRS_CHECK_API_KEY";
    pub const ENDPOINT_ENV: &'static str = "SRS_CHECK_ENDPOINT";
    pub const MODEL_ENV: &'static str = "SRS_CHECK_MODEL";
    pub const TIMEOUT_ENV: &'static str = "SRS_CHECK_TIMEOUT_SECS";
    pub const RETRIES_ENV: &'static str = "SRS_CHECK_MAX_RETRIES";
    pub const BACKOFF_ENV: &'static str = "SRS_CHECK_RETRY_BACKOFF_MS";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_BACKOFF_MS: u64 = 2_000;

    /// Load settings from environment variables.
    ///
    /// * `SRS_CHECK_PROVIDER`: `openai` (default, any OpenAI-compatible endpoint) or `noop`.
    /// * `SRS_CHECK_API_KEY`: bearer token (required unless the provider is `noop`).
    /// * `SRS_CHECK_ENDPOINT`: base URL; `/chat/completions` is appended.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    /// Settings for the offline oracle.
    pub fn noop() -> Self {
        Self {
            provider: "noop".into(),
            api_key: String::new(),
            endpoint: None,
            model: None,
            timeout_secs: None,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: Self::DEFAULT_BACKOFF_MS,
        }
    }

    pub fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let non_blank = |key: &str| vars.get(key).cloned().filter(|v| !v.trim().is_empty());

        let provider = non_blank(Self::PROVIDER_ENV)
            .unwrap_or_else(|| "openai".to_string())
            .trim()
            .to_lowercase();
        let api_key = match provider.as_str() {
            "noop" => vars.get(Self::API_KEY_ENV).cloned().unwrap_or_default(),
            _ => non_blank(Self::API_KEY_ENV).with_context(|| {
                format!(
                    "environment variable {} must be set for provider `{}`",
                    Self::API_KEY_ENV,
                    provider
                )
            })?,
        };
        let timeout_secs = vars
            .get(Self::TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok());
        let max_retries = vars
            .get(Self::RETRIES_ENV)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(Self::DEFAULT_MAX_RETRIES);
        let retry_backoff_ms = vars
            .get(Self::BACKOFF_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_BACKOFF_MS);

        Ok(Self {
            endpoint: non_blank(Self::ENDPOINT_ENV),
            model: non_blank(Self::MODEL_ENV),
            provider,
            api_key,
            timeout_secs,
            max_retries,
            retry_backoff_ms,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(Self::DEFAULT_TIMEOUT_SECS))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }
}
