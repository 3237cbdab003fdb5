//! A scriptable model adapter for tests and the CLI's dev runner.
//!
//! Returns a predefined sequence of [`ModelResponse`]s, cycling once the
//! sequence is exhausted. Scripting a run that always replies with a tool
//! call is what exercises the `maxSteps` exhaustion path without a real
//! provider.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::common::{GenerateOptions, ModelAdapter, ModelResponse};
use crate::error::AgentError;

/// A model adapter that replays a fixed, cycling sequence of responses.
#[derive(Debug)]
pub struct MockModel {
    model_id: String,
    responses: Vec<ModelResponse>,
    next: AtomicUsize,
}

impl MockModel {
    /// Create a mock model that cycles through `responses` in order.
    ///
    /// # Panics
    ///
    /// Not at construction; an empty `responses` vec makes every
    /// [`ModelAdapter::generate`] call return `AgentError::internal`.
    #[must_use]
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            responses,
            next: AtomicUsize::new(0),
        }
    }

    /// A mock model that always returns the same final answer.
    #[must_use]
    pub fn final_text(content: impl Into<String>) -> Self {
        Self::new(vec![ModelResponse::final_text(content.into())])
    }

    /// A mock model that always requests the same tool call, forever.
    /// Useful for exercising `max_steps` exhaustion.
    #[must_use]
    pub fn always_tool(tool: impl Into<String>, arguments: Value) -> Self {
        Self::new(vec![ModelResponse::tool_call(tool.into(), arguments)])
    }

    /// Override the reported model id.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

#[async_trait]
impl ModelAdapter for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<ModelResponse, AgentError> {
        if self.responses.is_empty() {
            return Err(AgentError::internal("mock model has no scripted responses"));
        }
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(self.responses[index % self.responses.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cycles_through_scripted_responses() {
        let model = MockModel::new(vec![ModelResponse::final_text("first".into()), ModelResponse::final_text("second".into())]);
        let options = GenerateOptions::default();

        let r1 = model.generate("p", &options).await.expect("generate");
        let r2 = model.generate("p", &options).await.expect("generate");
        let r3 = model.generate("p", &options).await.expect("generate");

        assert!(matches!(r1, ModelResponse::Final { content, .. } if content == "first"));
        assert!(matches!(r2, ModelResponse::Final { content, .. } if content == "second"));
        assert!(matches!(r3, ModelResponse::Final { content, .. } if content == "first"));
    }

    #[tokio::test]
    async fn always_tool_never_terminates_on_its_own() {
        let model = MockModel::always_tool("noop", Value::Null);
        let response = model.generate("p", &GenerateOptions::default()).await.expect("generate");
        assert!(matches!(response, ModelResponse::Tool { tool, .. } if tool == "noop"));
    }

    #[tokio::test]
    async fn empty_script_is_an_internal_error() {
        let model = MockModel::new(vec![]);
        let err = model.generate("p", &GenerateOptions::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::Internal { .. }));
    }

    #[test]
    fn custom_model_id() {
        let model = MockModel::final_text("hi").with_model_id("custom-mock");
        assert_eq!(model.model_id(), "custom-mock");
    }
}
