//! The model adapter boundary: a pluggable contract the agent core consumes.
//!
//! The core depends only on [`ModelAdapter::generate`]. Concrete HTTP-backed
//! providers (`OpenAI`, Ollama, ...) are external collaborators that
//! implement this trait outside the core crate; [`super::MockModel`] is the
//! only implementation shipped here, for tests and the CLI's dev runner.

use std::{pin::Pin, time::Duration};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::AgentError, tool::ToolDescriptor};

/// Token usage counters from a model response.
///
/// Carried through the run unconditionally but never interpreted by the
/// step loop itself; a caller may sum these across a run's events to
/// compute costs or budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens consumed by the completion.
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Build usage counters from prompt/completion token counts.
    #[must_use]
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self { prompt_tokens, completion_tokens }
    }

    /// Total tokens consumed (prompt + completion).
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.prompt_tokens + rhs.prompt_tokens, self.completion_tokens + rhs.completion_tokens)
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A tool offered to the model, derived from a registered [`ToolDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool's dotted id, e.g. `vfs.read`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON-schema-shaped input spec.
    pub input_schema: Value,
}

impl From<&ToolDescriptor> for ToolSpec {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Self {
            name: descriptor.id.clone(),
            description: descriptor.description.clone().unwrap_or_default(),
            input_schema: descriptor.input_schema.clone(),
        }
    }
}

/// Which tool, if any, the model should be steered toward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    #[default]
    Auto,
    /// The model must not call a tool.
    None,
    /// The model must call the named tool.
    Specific {
        /// The tool id to pin.
        tool: String,
    },
}

/// Options accompanying a prompt passed to [`ModelAdapter::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Sampling temperature, if the caller wants to override the adapter's
    /// own default.
    pub temperature: Option<f32>,
    /// Maximum tokens the model may generate.
    pub max_tokens: Option<u32>,
    /// Tools the model may call, derived from the engine's registered
    /// descriptors.
    pub tools: Vec<ToolSpec>,
    /// Tool-choice policy.
    pub tool_choice: ToolChoice,
}

impl GenerateOptions {
    /// Start from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max-tokens cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the tools offered to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the tool-choice policy.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }
}

/// The model's reply: either a final answer or a request to call a tool.
///
/// A closed tagged union, not an open-ended "message" type: the step loop
/// only ever reacts to these two shapes. A raw model reply that can't be
/// interpreted as either is represented as an [`AgentError::Parsing`]
/// returned from [`ModelAdapter::generate`], not as a third variant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelResponse {
    /// A final answer; the run terminates successfully.
    Final {
        /// The final answer text.
        content: String,
        /// Token usage, if the adapter reports it.
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
    /// A request to invoke a registered tool.
    Tool {
        /// The tool id to invoke.
        tool: String,
        /// Arguments to pass verbatim to the tool engine.
        arguments: Value,
        /// Token usage, if the adapter reports it.
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
}

impl ModelResponse {
    /// Build a final response with no usage counters.
    #[must_use]
    pub const fn final_text(content: String) -> Self {
        Self::Final { content, usage: None }
    }

    /// Build a tool-call response with no usage counters.
    #[must_use]
    pub const fn tool_call(tool: String, arguments: Value) -> Self {
        Self::Tool { tool, arguments, usage: None }
    }

    /// The usage counters carried by this response, if any.
    #[must_use]
    pub const fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::Final { usage, .. } | Self::Tool { usage, .. } => *usage,
        }
    }
}

/// A lazy sequence of partial responses from [`ModelAdapter::stream`].
///
/// Not consumed by the bundled step loop; present so an adapter has a shape
/// to target if a caller wants to stream a final answer to a UI.
pub type ModelStream = Pin<Box<dyn Stream<Item = Result<ModelResponse, AgentError>> + Send>>;

/// The core trait for language model implementations.
///
/// The agent core depends only on [`Self::generate`]; [`Self::stream`] is
/// optional and unused by the bundled step loop.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// The model identifier, e.g. `gpt-4o` or `mock-model`.
    fn model_id(&self) -> &str;

    /// Generate a response for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ModelTransient`] for retryable network/5xx/
    /// timeout failures, [`AgentError::ModelPermanent`] for invalid-request
    /// or auth failures, or [`AgentError::Parsing`] if the raw model output
    /// could not be interpreted as a [`ModelResponse`].
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<ModelResponse, AgentError>;

    /// Generate a streaming response. Unused by the bundled step loop.
    ///
    /// # Errors
    ///
    /// The default implementation always returns
    /// `Err(AgentError::unsupported(..))`.
    async fn stream(&self, _prompt: &str, _options: &GenerateOptions) -> Result<ModelStream, AgentError> {
        Err(AgentError::unsupported(format!("{} does not implement streaming", self.model_id())))
    }
}

/// Retry policy for transient [`ModelAdapter::generate`] failures.
///
/// `delay = base_delay_ms * backoff_multiplier^attempt + jitter[0,100)ms`.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_attempts: u32,
    /// Base delay in milliseconds before the first retry.
    pub base_delay_ms: u64,
    /// Exponential backoff multiplier applied per attempt.
    pub backoff_multiplier: f64,
    /// Whether to add `[0,100)`ms of jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// The delay to wait before retry attempt number `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let backoff_ms = (self.base_delay_ms as f64) * self.backoff_multiplier.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        let jitter_ms = if self.jitter { jitter_component() } else { 0 };
        Duration::from_millis(backoff_ms as u64 + jitter_ms)
    }
}

/// A `[0,100)`ms jitter component derived from the clock's sub-second
/// resolution. Not cryptographic; just enough to desynchronize concurrent
/// retries without pulling in a `rand` dependency the rest of the workspace
/// doesn't otherwise need.
fn jitter_component() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_add_assign() {
        let mut total = TokenUsage::new(10, 5);
        total += TokenUsage::new(3, 2);
        assert_eq!(total, TokenUsage::new(13, 7));
        assert_eq!(total.total(), 20);
    }

    #[test]
    fn retry_delay_grows_exponentially_within_jitter_bounds() {
        let retry = RetryConfig { jitter: false, ..RetryConfig::default() };
        assert_eq!(retry.delay_for(0), Duration::from_millis(200));
        assert_eq!(retry.delay_for(1), Duration::from_millis(400));
        assert_eq!(retry.delay_for(2), Duration::from_millis(800));
    }

    #[test]
    fn tool_spec_from_descriptor() {
        let descriptor = ToolDescriptor::builtin("fs.read", "fs.read").with_description("reads a file");
        let spec = ToolSpec::from(&descriptor);
        assert_eq!(spec.name, "fs.read");
        assert_eq!(spec.description, "reads a file");
    }

    #[test]
    fn model_response_carries_usage() {
        let response = ModelResponse::Final { content: "done".into(), usage: Some(TokenUsage::new(10, 2)) };
        assert_eq!(response.usage(), Some(TokenUsage::new(10, 2)));
    }
}
