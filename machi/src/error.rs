//! Error types for the machi agent runtime.
//!
//! This module defines all error types used throughout the framework,
//! providing rich error context for debugging and error handling.

use thiserror::Error;

/// A type alias for `Result<T, AgentError>`.
pub type Result<T> = std::result::Result<T, AgentError>;

/// The main error type for agent-core operations.
///
/// Variants line up with the error taxonomy: `ToolExecution`/`Parsing` are
/// carried over from tool-call handling, the rest correspond directly to a
/// taxonomy entry (`model_transient`/`model_permanent`/`max_steps_exceeded`/
/// `cancelled`/`internal`/`configuration`).
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error during tool execution that escaped the tool engine's envelope
    /// (should not normally happen; the engine normalizes tool failures).
    #[error("tool execution error in '{tool_name}': {message}")]
    ToolExecution {
        /// Name of the tool that failed.
        tool_name: String,
        /// The underlying error message.
        message: String,
    },

    /// Error parsing model output into a [`crate::providers::ModelResponse`].
    #[error("parsing error: {message}. output: {output}")]
    Parsing {
        /// The output that failed to parse.
        output: String,
        /// The parsing error message.
        message: String,
    },

    /// Transient model-adapter failure (network, 5xx, timeout). Retried by
    /// the step loop per the retry policy before becoming terminal.
    #[error("transient model error: {message}")]
    ModelTransient {
        /// The underlying error message.
        message: String,
    },

    /// Permanent model-adapter failure (invalid request, auth). Not
    /// retried; surfaced to the caller as a run termination.
    #[error("model error: {message}")]
    ModelPermanent {
        /// The underlying error message.
        message: String,
    },

    /// Agent reached maximum number of steps without a final answer.
    #[error("max steps exceeded ({steps}/{max_steps})")]
    MaxSteps {
        /// Number of steps taken.
        steps: usize,
        /// Maximum allowed steps.
        max_steps: usize,
    },

    /// Agent run was cancelled via its cancellation signal.
    #[error("agent run was cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration issue.
        message: String,
    },

    /// HTTP/network error (tool runners, provider transports).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreachable state or invariant violation: a bug signal.
    #[error("internal error: {message}")]
    Internal {
        /// The underlying error message.
        message: String,
    },

    /// The called capability is intentionally not implemented (e.g. a model
    /// adapter that doesn't support streaming).
    #[error("unsupported: {message}")]
    Unsupported {
        /// The underlying error message.
        message: String,
    },
}

impl AgentError {
    /// Create a new tool execution error.
    #[must_use]
    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create a new parsing error.
    #[must_use]
    pub fn parsing(output: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parsing {
            output: output.into(),
            message: message.into(),
        }
    }

    /// Create a new transient model error.
    #[must_use]
    pub fn model_transient(message: impl Into<String>) -> Self {
        Self::ModelTransient {
            message: message.into(),
        }
    }

    /// Create a new permanent model error.
    #[must_use]
    pub fn model_permanent(message: impl Into<String>) -> Self {
        Self::ModelPermanent {
            message: message.into(),
        }
    }

    /// Create a new max-steps error.
    #[must_use]
    pub const fn max_steps(steps: usize, max_steps: usize) -> Self {
        Self::MaxSteps { steps, max_steps }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new unsupported-capability error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Whether this error represents a transient condition the step loop
    /// should retry rather than terminate the run over.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ModelTransient { .. })
    }
}

/// Error codes from the tool-engine taxonomy, normalized into every
/// [`crate::tool::ToolResult::Err`] by the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorCode {
    /// Tool id is not registered.
    NotFound,
    /// Caller's effective permission set does not cover the descriptor's
    /// required permissions.
    PermissionDenied,
    /// Arguments failed the descriptor's input schema.
    SchemaViolation,
    /// Runner crashed or returned a non-conforming value.
    RunnerFailure,
    /// Runner exceeded its deadline and was terminated.
    Timeout,
}

impl ToolErrorCode {
    /// The wire string used in `ToolResult.error.code`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::SchemaViolation => "schema_violation",
            Self::RunnerFailure => "runner_failure",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ToolErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-local tool failure, normalized at the invocation boundary into
/// the `ok:false` shape of [`crate::tool::ToolResult`]. Never crosses the
/// engine boundary as a raised error.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ToolError {
    /// Machine-readable taxonomy code.
    pub code: ToolErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail (e.g. the offending schema path).
    pub details: Option<serde_json::Value>,
}

impl ToolError {
    /// Build a tool error with no structured detail.
    #[must_use]
    pub fn new(code: ToolErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured detail to this error.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Shorthand for [`ToolErrorCode::NotFound`].
    #[must_use]
    pub fn not_found(tool_id: impl std::fmt::Display) -> Self {
        Self::new(ToolErrorCode::NotFound, format!("no tool registered as '{tool_id}'"))
    }

    /// Shorthand for [`ToolErrorCode::PermissionDenied`].
    #[must_use]
    pub fn permission_denied(tool_id: impl std::fmt::Display, missing: &[String]) -> Self {
        Self::new(
            ToolErrorCode::PermissionDenied,
            format!("'{tool_id}' requires permissions {missing:?}"),
        )
    }

    /// Shorthand for [`ToolErrorCode::SchemaViolation`].
    #[must_use]
    pub fn schema_violation(tool_id: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::new(ToolErrorCode::SchemaViolation, format!("'{tool_id}' rejected its arguments: {}", message.into()))
    }

    /// Shorthand for [`ToolErrorCode::RunnerFailure`].
    #[must_use]
    pub fn runner_failure(message: impl Into<String>) -> Self {
        Self::new(ToolErrorCode::RunnerFailure, message)
    }

    /// Shorthand for [`ToolErrorCode::Timeout`].
    #[must_use]
    pub fn timeout(deadline_ms: u64) -> Self {
        Self::new(
            ToolErrorCode::Timeout,
            format!("runner exceeded its {deadline_ms}ms deadline"),
        )
    }
}
