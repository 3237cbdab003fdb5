//! Tool registry and sandboxed execution.
//!
//! A tool is registered as a [`ToolDescriptor`] (static metadata: id, input
//! schema, required permissions) paired with a [`ToolRegistration`] (the
//! executable payload). [`ToolEngine`] owns the registry and is the only
//! way to invoke a tool; every invocation returns a [`ToolResult`] envelope
//! and is journaled on the event bus.

mod descriptor;
mod engine;
mod registration;
mod result;
mod runner;

pub use descriptor::{RunnerKind, ToolDescriptor};
pub use engine::ToolEngine;
pub use registration::{BoxFuture, BuiltinFn, ToolRegistration};
pub use result::{ToolResult, ToolResultError};
pub use runner::DEFAULT_RUNNER_TIMEOUT;
