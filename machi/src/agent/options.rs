//! Run options for agent execution.

/// Options for one [`super::Agent::run`] call.
///
/// A bare string task converts via [`From`], so the common case needs no
/// builder at all: `agent.run("what is 2+2?").await?`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The task to perform.
    pub(crate) task: String,
}

impl RunOptions {
    /// Create run options for `task`.
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}

impl<S: Into<String>> From<S> for RunOptions {
    fn from(task: S) -> Self {
        Self::new(task)
    }
}
