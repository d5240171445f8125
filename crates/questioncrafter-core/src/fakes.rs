//! In-memory fakes for the model seam (testing only)
//!
//! `ScriptedModel` replays canned replies in order and records every request
//! it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::metrics::METRICS;
use crate::model::{ChatModel, CompletionRequest, ModelError, ModelReply, ModelResult};

/// Chat model that answers from a queue of prepared replies.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelResult<ModelReply>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw reply texts, classified the same way a live reply would be.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for text in texts {
            model.push_text(text);
        }
        model
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push_reply(ModelReply::classify(text));
    }

    pub fn push_reply(&self, reply: ModelReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: ModelError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> ModelResult<ModelReply> {
        METRICS.inc_model_calls();
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::MalformedResponse(
                    "scripted model has no replies left".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_errors() {
        let model = ScriptedModel::with_texts(["one", "two"]);
        let first = model.complete(CompletionRequest::prompt("a")).await.unwrap();
        let second = model.complete(CompletionRequest::prompt("b")).await.unwrap();
        assert_eq!(first.into_text(), "one");
        assert_eq!(second.into_text(), "two");
        assert!(model.complete(CompletionRequest::prompt("c")).await.is_err());
        assert_eq!(model.calls(), 3);
        assert_eq!(model.requests()[1].last_prompt(), Some("b"));
    }

    #[tokio::test]
    async fn queued_errors_surface() {
        let model = ScriptedModel::new();
        model.push_error(ModelError::EmptyReply);
        assert!(matches!(
            model.complete(CompletionRequest::prompt("x")).await,
            Err(ModelError::EmptyReply)
        ));
        assert_eq!(model.remaining(), 0);
    }
}
