//! Chat-completion client for OpenAI-compatible endpoints (OpenAI, Azure OpenAI, Ollama)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::CompletionSettings;
use super::types::PromptMessage;
use super::Completer;
use crate::cancellation::run_cancellable;
use crate::config::AppConfig;
use crate::errors::RagChatError;
use crate::errors::Result;

/// How requests are addressed and authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
enum Flavor {
    /// `{endpoint}/chat/completions` with a bearer token
    OpenAi,
    /// `{endpoint}/openai/deployments/{model}/chat/completions?api-version=` with an `api-key` header
    Azure { api_version: String },
}

/// Chat-completion service, built once and shared across requests
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    flavor: Flavor,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmService {
    /// Create the service from the `[llm]` config section
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_endpoint(
            config.llm_endpoint(),
            config.llm_key(),
            config.llm_model(),
            config.llm.api_version.clone(),
        )
    }

    /// Create the service for an explicit endpoint
    ///
    /// Passing an `api_version` selects Azure OpenAI addressing.
    pub fn with_endpoint(
        endpoint: &str,
        api_key: &str,
        model: &str,
        api_version: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let flavor = match api_version {
            Some(api_version) => Flavor::Azure { api_version },
            None => Flavor::OpenAi,
        };

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            flavor,
        })
    }

    /// Model (or deployment) name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        match &self.flavor {
            Flavor::OpenAi => format!("{}/chat/completions", self.endpoint),
            Flavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.endpoint, self.model, api_version
            ),
        }
    }

    async fn send(
        &self,
        messages: &[PromptMessage],
        settings: &CompletionSettings,
    ) -> Result<String> {
        let url = self.completions_url();
        debug!(
            "Calling chat completions: {} ({} messages, temperature {})",
            url,
            messages.len(),
            settings.temperature
        );

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            stop: &settings.stop_sequences,
        };

        let mut request = self.client.post(&url).json(&body);
        request = match self.flavor {
            Flavor::OpenAi if !self.api_key.is_empty() => request.bearer_auth(&self.api_key),
            Flavor::OpenAi => request,
            Flavor::Azure { .. } => request.header("api-key", &self.api_key),
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagChatError::LlmError(format!(
                "Chat completion error ({status}): {error_text}"
            )));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| RagChatError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RagChatError::EmptyCompletion(self.model.clone()))
    }
}

#[async_trait]
impl Completer for LlmService {
    async fn complete(
        &self,
        messages: &[PromptMessage],
        settings: &CompletionSettings,
        cancel: &CancellationToken,
    ) -> Result<String> {
        run_cancellable(cancel, self.send(messages, settings)).await
    }
}
