//! Convenient re-exports for the common case of wiring an agent together.
//!
//! ```rust
//! use machi::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let bus = std::sync::Arc::new(EventBus::default());
//! let tools = std::sync::Arc::new(ToolEngine::new(bus.clone()));
//! let agent = Agent::builder()
//!     .model(Box::new(MockModel::final_text("hi")))
//!     .tools(tools)
//!     .bus(bus)
//!     .build();
//! let outcome = agent.run("say hi").await?;
//! assert!(outcome.ok);
//! # Ok(())
//! # }
//! ```

pub use crate::agent::{Agent, AgentBuilder, AgentConfig, RunOptions, RunOutcome, RunState};
pub use crate::bus::{BusConfig, Event, EventBus, EventType, HistoryQuery, ListenerId, RetentionPolicy};
pub use crate::error::{AgentError, Result, ToolError, ToolErrorCode};
pub use crate::prompts::{PromptContext, PromptEngine};
pub use crate::providers::{GenerateOptions, ModelAdapter, ModelResponse, MockModel, RetryConfig, ToolChoice, ToolSpec};
pub use crate::tool::{ToolDescriptor, ToolEngine, ToolRegistration, ToolResult};
pub use crate::tools::register_builtins;
pub use crate::vfs::Vfs;
