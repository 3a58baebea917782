//! OpenAI-compatible `/chat/completions` client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatCompletion;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::ChatMessage;

pub struct CompletionClient {
    model: String,
    endpoint: String,
    api_key: String,
    temperature: Option<f32>,
    client: Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionClient {
    pub fn new(
        model: String,
        endpoint: String,
        api_key: String,
        temperature: Option<f32>,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopChatError::HttpError(e.to_string()))?;

        Ok(Self {
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            temperature,
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.completion_model().to_string(),
            config.openai_base_url().to_string(),
            config.openai.api_key.clone(),
            config.openai.temperature,
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl ChatCompletion for CompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions API: {} ({} messages, model {})",
            url,
            messages.len(),
            self.model
        );

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopChatError::CompletionError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ShopChatError::CompletionError(format!(
                "API error ({status}): {text}"
            )));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            ShopChatError::CompletionError(format!("Failed to parse response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ShopChatError::CompletionError("No choices in response".to_string()))
    }
}
