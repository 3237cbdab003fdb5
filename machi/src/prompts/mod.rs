//! System-prompt rendering.
//!
//! Before the first step of a run, the agent renders one system prompt from
//! its name, description, custom instructions, and the tool engine's
//! registered descriptors, using a [`minijinja`] template. This is the
//! single general-purpose template the agent core needs; it does not carry
//! the planning/managed-agent template families a fuller agent framework
//! would.

mod engine;

pub use engine::{PromptContext, PromptEngine, RenderError, ToolInfo};
