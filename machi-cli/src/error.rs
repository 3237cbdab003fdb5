//! The CLI's own error type: wraps library failures and adds I/O/usage
//! failures specific to the command surface.

use std::fmt;

/// Failure from a CLI command. Always surfaces as exit code 1, with
/// `Display` written to stderr.
#[derive(Debug)]
pub enum CliError {
    /// An error raised by the `machi` library core.
    Agent(machi::AgentError),
    /// A filesystem operation failed.
    Io(std::io::Error),
    /// A JSON golden-case file failed to parse.
    Json(serde_json::Error),
    /// A usage or workspace-state error specific to the CLI.
    Usage(String),
    /// A golden case ran but its expectation was not met.
    Assertion(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::Usage(message) | Self::Assertion(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<machi::AgentError> for CliError {
    fn from(err: machi::AgentError) -> Self {
        Self::Agent(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
