//! The model adapter interface and the bundled reference implementation.
//!
//! The agent core depends only on [`ModelAdapter`]; concrete HTTP-backed
//! providers (`OpenAI`, Ollama, Anthropic, ...) are external collaborators
//! that implement this trait outside the core crate. [`MockModel`] is the
//! only implementation shipped here, for tests and the CLI's dev runner.

mod common;
mod mock;

pub use common::{GenerateOptions, ModelAdapter, ModelResponse, ModelStream, RetryConfig, TokenUsage, ToolChoice, ToolSpec};
pub use mock::MockModel;
