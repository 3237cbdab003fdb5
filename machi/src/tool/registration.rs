//! The executable payload half of a tool registration.

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use super::ToolResult;

/// A boxed, type-erased async tool body.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A native callable backing a `builtin` tool.
pub type BuiltinFn = Arc<dyn Fn(Value) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// The executable half of a tool registration, paired with a
/// [`super::ToolDescriptor`] in the registry.
///
/// Dynamic payloads (a native callable vs. source text) are stored under
/// one tagged union rather than two optional fields, so the engine's
/// dispatch matches on a closed set of cases instead of reconstructing the
/// tag from which field happens to be populated.
#[derive(Clone)]
pub enum ToolRegistration {
    /// A native async callable, invoked in-process.
    Builtin(BuiltinFn),
    /// Source text for a sandboxed `js` or `py` runner.
    Script {
        /// The tool source, in the language implied by the descriptor's
        /// `runner` field.
        source: String,
    },
}

impl std::fmt::Debug for ToolRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(_) => f.write_str("ToolRegistration::Builtin(..)"),
            Self::Script { source } => f.debug_struct("ToolRegistration::Script").field("source_len", &source.len()).finish(),
        }
    }
}

impl ToolRegistration {
    /// Wrap a plain async function into a [`Self::Builtin`] registration.
    pub fn builtin<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        Self::Builtin(Arc::new(move |args| Box::pin(f(args))))
    }

    /// Wrap source text into a [`Self::Script`] registration.
    #[must_use]
    pub fn script(source: impl Into<String>) -> Self {
        Self::Script { source: source.into() }
    }
}
