// Client for OpenAI-compatible chat completion endpoints (OpenAI, Llama Stack, vLLM, ...)

use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI-compatible client (HTTP direct, no SDK)
///
/// Requests go to `{base_url}/chat/completions`. The API key is optional since
/// self-hosted servers such as Llama Stack usually run without one.
#[derive(Debug)]
pub struct OpenAICompatibleClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAICompatibleClient {
    /// Create a client for `base_url` with no API key and the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> OpenAICompatibleClientBuilder {
        OpenAICompatibleClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build chat completion request payload
    fn build_chat_request<'a>(
        model: &'a str,
        messages: &'a [Message],
        options: &ChatOptions,
    ) -> ChatCompletionPayload<'a> {
        ChatCompletionPayload {
            model,
            messages,
            stream: false,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }
}

/// Builder for OpenAICompatibleClient
#[derive(Default)]
pub struct OpenAICompatibleClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAICompatibleClientBuilder {
    /// Set the API base URL
    /// Example: "http://localhost:8321/v1/openai/v1"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Upper bound for one completion round trip
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OpenAICompatibleClient> {
        let base_url = self.base_url.context("Base URL is required")?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("Base URL is required");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = self.api_key.filter(|k| !k.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", api_key))
                    .context("Invalid API key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(OpenAICompatibleClient {
            http_client,
            base_url,
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for OpenAICompatibleClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload =
            Self::build_chat_request(&request.model, &request.messages, &request.options);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(self.completions_url())
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error ({}): {}", status, error_text);
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse response")?;
        let parsed: ChatCompletionResponse =
            serde_json::from_value(raw.clone()).context("Malformed chat completion response")?;

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("LLM API returned no choices")?;
        let content = choice
            .message
            .content
            .context("LLM API returned a choice without content")?;

        Ok(ChatResponse {
            content,
            usage,
            finish_reason: choice.finish_reason,
            raw,
        })
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionPayload<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
