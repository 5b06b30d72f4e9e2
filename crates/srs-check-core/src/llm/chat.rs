use super::{retry::RetryPolicy, LlmClient, LlmSettings};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const SYSTEM_PROMPT: &str = "You are a professional requirements-document reviewer with expertise in software engineering and requirements analysis.";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 4000;

/// OpenAI-compatible `/chat/completions` client.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl ChatCompletionsClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            bail!(
                "chat completions API key must be provided via {}",
                LlmSettings::API_KEY_ENV
            );
        }
        let base = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let url = format!("{}/chat/completions", base.trim_end_matches('/'));
        let http = Client::builder()
            .user_agent(concat!("srs-check/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout())
            .build()
            .context("failed to build chat completions HTTP client")?;
        Ok(Self {
            http,
            url,
            api_key: settings.api_key.clone(),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            retry: settings.retry_policy(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One POST. Transport errors, non-2xx statuses and undecodable bodies
    /// all fail the attempt, and the retry policy retries each of them.
    async fn attempt(&self, payload: &ChatCompletionRequest<'_>) -> Result<String> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .context("failed to call chat completions API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("chat completions API error ({}): {}", status, body);
        }

        let chat: ChatCompletionResponse = response
            .json()
            .await
            .context("failed to parse chat completions response")?;
        chat.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completions response missing message content"))
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    #[instrument(name = "llm_call", skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.chars().count()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let content = self.retry.run(|_| self.attempt(&payload)).await?;
        debug!(response_chars = content.chars().count(), "oracle responded");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
