//! OpenAI-compatible chat completions client

use super::{ContentGenerator, Prompt};
use crate::artifact::DraftRequest;
use crate::config::{LlmConfig, Secret};
use crate::error::{Error, GenerationError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
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
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Content generator backed by `{base_url}/chat/completions`
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    api_key: Secret,
    model: String,
    temperature: f32,
    max_tokens: u32,
    language: String,
}

impl OpenAiGenerator {
    pub fn new(config: &LlmConfig, api_key: Secret) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create LLM HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            language: config.language.clone(),
        })
    }
}

fn map_http_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Upstream(format!("request timeout: {}", error))
    } else if error.is_connect() {
        GenerationError::Upstream(format!("connection error: {}", error))
    } else {
        GenerationError::Upstream(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        request: &DraftRequest,
    ) -> std::result::Result<String, GenerationError> {
        let prompt = Prompt::for_request(request, &self.language);
        tracing::debug!(
            kind = %request.kind(),
            model = %self.model,
            prompt_len = prompt.user.len(),
            "Requesting completion"
        );

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Upstream(match status.as_u16() {
                401 | 403 => format!("authentication failed: {}", detail),
                429 => format!("rate limit or quota exceeded: {}", detail),
                404 => format!("model '{}' not found: {}", self.model, detail),
                _ => format!("request failed with status {}: {}", status, detail),
            }));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Upstream(format!("failed to parse response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
