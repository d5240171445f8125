//! Language model seam.
//!
//! The pipeline only needs one capability from its environment: send an
//! ordered list of turns and get a reply back. [`ChatModel`] is that seam;
//! [`OpenAiChatModel`] is the production implementation and
//! [`crate::fakes::ScriptedModel`] the test double.

pub mod openai;
pub mod reply;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::{ModelConfig, OpenAiChatModel};
pub use reply::{extract_json_object, strip_code_fences, ModelReply};

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

/// A single model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub turns: Vec<Turn>,
    /// Set when the prompt declares an output schema; providers that support
    /// a JSON response mode enable it.
    pub expects_json: bool,
}

impl CompletionRequest {
    /// One-shot request with a single user prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(text)],
            expects_json: false,
        }
    }

    /// Continue an existing conversation.
    pub fn conversation(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            expects_json: false,
        }
    }

    pub fn expecting_json(mut self) -> Self {
        self.expects_json = true;
        self
    }

    /// Text of the last user turn, if any.
    pub fn last_prompt(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .map(|t| t.text.as_str())
    }
}

/// Failures of the model invocation itself.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model API key is not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("http error: {0}")]
    Http(String),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model returned no content")]
    EmptyReply,
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.to_string())
    }
}

/// Result type for model invocations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Request/response access to a language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the turns and return the model's reply. No retries.
    async fn complete(&self, request: CompletionRequest) -> ModelResult<ModelReply>;
}
