mod chat;
mod retry;
mod settings;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::warn;

pub use chat::ChatCompletionsClient;
pub use retry::RetryPolicy;
pub use settings::LlmSettings;

/// The validation oracle: one prompt in, one free-form completion out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `prompt` and return the model's text. Errors once retries are exhausted.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle used when no provider is configured. Always unavailable, so every
/// node receives the default-compliant verdict.
#[derive(Debug, Default, Clone)]
pub struct NoopLlmClient;

#[async_trait]
impl LlmClient for NoopLlmClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("LLM provider not configured (noop)")
    }
}

/// Run `prompt` against `client`, mapping any failure to `None`.
pub async fn call_optional(client: &dyn LlmClient, prompt: &str) -> Option<String> {
    match client.complete(prompt).await {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "validation oracle unavailable");
            None
        }
    }
}

/// Construct the client named by `settings.provider`.
pub fn build_client(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>> {
    match settings.provider.as_str() {
        "noop" => Ok(Arc::new(NoopLlmClient)),
        "openai" | "deepseek" | "openai-compatible" => {
            Ok(Arc::new(ChatCompletionsClient::new(settings)?))
        }
        other => bail!("unsupported LLM provider `{other}` (expected openai or noop)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_client_is_unavailable() {
        assert!(call_optional(&NoopLlmClient, "prompt").await.is_none());
    }

    #[test]
    fn build_client_dispatches_on_provider() {
        assert!(build_client(&LlmSettings::noop()).is_ok());

        let mut settings = LlmSettings::noop();
        settings.provider = "openai".into();
        settings.api_key = "key".into();
        assert!(build_client(&settings).is_ok());

        settings.provider = "carrier-pigeon".into();
        let err = build_client(&settings).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
