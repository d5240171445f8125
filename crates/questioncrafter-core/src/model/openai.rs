//! OpenAI Chat Completions client.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatModel, CompletionRequest, ModelError, ModelReply, ModelResult, TurnRole};
use crate::metrics::METRICS;

pub const DEFAULT_MODEL: &str = "o3-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Model client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            api_key: env::var("OPENAI_API_KEY")
                .or_else(|_| env::var("openai_api_key"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: env::var("QUESTIONCRAFTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelConfig {
    /// Read the configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Explicit configuration, ignoring the environment.
    pub fn new(api_key: &str, model: &str) -> Self {
        ModelConfig {
            api_key: Some(api_key.to_string()),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// [`ChatModel`] backed by the OpenAI HTTP API.
pub struct OpenAiChatModel {
    config: ModelConfig,
    http_client: reqwest::Client,
}

impl OpenAiChatModel {
    pub fn new(config: ModelConfig) -> ModelResult<Self> {
        if config.api_key.is_none() {
            return Err(ModelError::MissingApiKey);
        }
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("questioncrafter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(OpenAiChatModel {
            config,
            http_client,
        })
    }

    pub fn from_env() -> ModelResult<Self> {
        Self::new(ModelConfig::from_env())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.config.model,
            messages: request
                .turns
                .iter()
                .map(|turn| ChatMessage {
                    role: match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Assistant => "assistant",
                    },
                    content: &turn.text,
                })
                .collect(),
            temperature: self.config.temperature,
            response_format: request.expects_json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: CompletionRequest) -> ModelResult<ModelReply> {
        METRICS.inc_model_calls();
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ModelError::MissingApiKey)?;

        debug!(
            model = %self.config.model,
            turns = request.turns.len(),
            expects_json = request.expects_json,
            "sending chat completion"
        );

        let response = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyReply)?;

        Ok(ModelReply::classify(content))
    }
}
